//! StageRunner - one persona, one completion, one AnalysisResult.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::extraction::ResponseExtractor;
use crate::domain::persona::PersonaProfile;
use crate::domain::story::{AnalysisResult, ReviewStageStatus, Story, StructuredFields};
use crate::ports::{CompletionClient, CompletionRequest};

/// Generation parameters applied to every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

impl CompletionSettings {
    /// Builds the request a persona sends for a story.
    pub fn request_for(&self, persona: &PersonaProfile, story: &Story) -> CompletionRequest {
        CompletionRequest::new(persona.role_description(), persona.render_prompt(story))
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
    }
}

/// Runs a single review stage.
#[derive(Clone)]
pub struct StageRunner {
    client: Arc<dyn CompletionClient>,
    extractor: Arc<ResponseExtractor>,
    settings: CompletionSettings,
}

impl StageRunner {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        extractor: Arc<ResponseExtractor>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            client,
            extractor,
            settings,
        }
    }

    /// Asks `persona` to review `story` and tags the outcome with `stage`.
    ///
    /// A completion failure yields an `Error` result carrying the failure
    /// description; it is never returned as `Err`.
    pub async fn run_stage(
        &self,
        persona: &PersonaProfile,
        story: &Story,
        stage: ReviewStageStatus,
    ) -> AnalysisResult {
        info!(
            persona = %persona.name,
            %stage,
            story_version = story.version(),
            "Running review stage"
        );

        let request = self.settings.request_for(persona, story);
        let response = match self.client.complete(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(persona = %persona.name, %stage, error = %err, "Review stage failed");
                let mut fields = StructuredFields::new();
                fields.insert("error_kind".to_string(), "completion_failure".into());
                return AnalysisResult::new(
                    story.clone(),
                    None,
                    format!("{} review failed: {}", persona.role_title, err),
                    fields,
                    ReviewStageStatus::Error,
                );
            }
        };

        let improved = self.extractor.extract_improved_story(&response.text, story);
        let fields = match stage {
            ReviewStageStatus::AgileReview => self.extractor.agile_fields(&response.text),
            ReviewStageStatus::TechnicalReview => self.extractor.technical_fields(&response.text),
            _ => StructuredFields::new(),
        };

        info!(
            persona = %persona.name,
            %stage,
            improved = improved.is_some(),
            fields = fields.len(),
            "Review stage finished"
        );

        AnalysisResult::new(story.clone(), improved, response.text, fields, stage)
    }
}
