use serde::Serialize;

use super::prompts;
use crate::domain::estimation::{EstimationScale, EstimationUnit};
use crate::domain::story::Story;

/// Which prompt a persona renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptTemplate {
    AgileReview,
    TechnicalReview,
    Estimate {
        unit: EstimationUnit,
        scale: Option<EstimationScale>,
        considerations: Vec<String>,
    },
}

/// A named reviewer or estimator.
///
/// Profiles are built once and shared read-only between concurrent calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaProfile {
    pub key: String,
    pub name: String,
    pub role_title: String,
    pub experience_years: f32,
    #[serde(skip)]
    pub template: PromptTemplate,
}

impl PersonaProfile {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        role_title: impl Into<String>,
        experience_years: f32,
        template: PromptTemplate,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            role_title: role_title.into(),
            experience_years,
            template,
        }
    }

    /// The system-level description sent alongside the prompt.
    pub fn role_description(&self) -> String {
        match &self.template {
            PromptTemplate::AgileReview | PromptTemplate::TechnicalReview => {
                format!("You are an experienced {}.", self.role_title)
            }
            PromptTemplate::Estimate { scale, .. } => {
                let mut description = format!(
                    "You are a {} with {} years of experience.",
                    self.role_title, self.experience_years
                );
                if let Some(scale) = scale {
                    description.push_str(&format!(
                        " You MUST estimate using only these story point values: {}.",
                        scale.describe()
                    ));
                }
                description
            }
        }
    }

    pub fn render_prompt(&self, story: &Story) -> String {
        match &self.template {
            PromptTemplate::AgileReview => prompts::agile_review(story),
            PromptTemplate::TechnicalReview => prompts::technical_review(story),
            PromptTemplate::Estimate {
                unit,
                scale,
                considerations,
            } => prompts::estimate(self, story, *unit, scale.as_ref(), considerations),
        }
    }

    /// Unit and scale, for estimator personas.
    pub fn estimation(&self) -> Option<(EstimationUnit, Option<&EstimationScale>)> {
        match &self.template {
            PromptTemplate::Estimate { unit, scale, .. } => Some((*unit, scale.as_ref())),
            _ => None,
        }
    }
}
