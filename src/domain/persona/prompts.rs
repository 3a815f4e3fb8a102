//! Prompt text for each persona kind.
//!
//! Section headers here line up with the default extraction markers.

use super::PersonaProfile;
use crate::domain::estimation::{EstimationScale, EstimationUnit};
use crate::domain::story::Story;

fn story_block(story: &Story) -> String {
    let context = if story.context().trim().is_empty() {
        "None provided"
    } else {
        story.context()
    };
    format!(
        "Story:\n{}\n\nAcceptance Criteria:\n{}\n\nContext:\n{}",
        story.text(),
        story.formatted_criteria(),
        context
    )
}

pub(super) fn agile_review(story: &Story) -> String {
    format!(
        "Review the following user story against the INVEST criteria and improve it.\n\n\
         {}\n\n\
         Please provide your response in the following format:\n\n\
         INVEST Analysis:\n[One line per INVEST criterion]\n\n\
         Improved Story:\n[The rewritten user story]\n\n\
         Enhanced Acceptance Criteria:\n[One criterion per line]\n\n\
         Areas for Clarification:\n[Open questions for the product owner]",
        story_block(story)
    )
}

pub(super) fn technical_review(story: &Story) -> String {
    format!(
        "Review the following user story from a technical perspective.\n\n\
         {}\n\n\
         Please provide your response in the following format:\n\n\
         Technical Analysis:\n\
         - Feasibility: [High/Medium/Low]\n\
         - Complexity: [High/Medium/Low]\n\
         - Dependencies: [Systems or teams this relies on]\n\
         - Technical Risks: [Main risks]\n\n\
         Improved Story:\n[The story with technical detail added]\n\n\
         Enhanced Acceptance Criteria:\n[Technical acceptance criteria, one per line]\n\n\
         Implementation Details:\n[Architecture, data and testing notes]",
        story_block(story)
    )
}

pub(super) fn estimate(
    persona: &PersonaProfile,
    story: &Story,
    unit: EstimationUnit,
    scale: Option<&EstimationScale>,
    considerations: &[String],
) -> String {
    let consider = considerations
        .iter()
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n");
    let placeholder = match scale {
        Some(scale) => format!("[One of: {}]", scale.describe()),
        None => "[X.X]".to_string(),
    };
    let measure = match unit {
        EstimationUnit::PersonDays => "an effort estimate in person-days",
        EstimationUnit::StoryPoints => "a story point estimate",
    };

    format!(
        "As a {} with {} years of experience, please analyze this user story and provide {}.\n\n\
         {}\n\n\
         Consider:\n{}\n\n\
         Please provide your response in the following format:\n\n\
         Effort Estimate:\n\
         - {}: {}\n\
         - Confidence Level: [High/Medium/Low]\n\n\
         Risk Factors:\n[Risks that could move the estimate]\n\n\
         Explanation:\n[Brief justification of your estimate]",
        persona.role_title,
        persona.experience_years,
        measure,
        story_block(story),
        consider,
        unit.field_label(),
        placeholder
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extraction::{MarkerSet, ResponseExtractor};
    use crate::domain::persona::PromptTemplate;

    fn story() -> Story {
        Story::new(
            "passwords reset every 90 days",
            vec!["notice must be given".to_string()],
            "security audits",
        )
    }

    #[test]
    fn agile_prompt_embeds_story() {
        let prompt = agile_review(&story());
        assert!(prompt.contains("passwords reset every 90 days"));
        assert!(prompt.contains("- notice must be given"));
        assert!(prompt.contains("security audits"));
    }

    #[test]
    fn empty_context_is_marked() {
        let prompt = technical_review(&Story::new("t", vec![], ""));
        assert!(prompt.contains("Context:\nNone provided"));
    }

    #[test]
    fn prompt_headers_are_known_markers() {
        let markers = MarkerSet::default();
        let prompt = agile_review(&story());
        for header in [&markers.invest_analysis[0], &markers.improved_story[0], &markers.acceptance_criteria[0]] {
            assert!(prompt.contains(header.as_str()), "missing {}", header);
        }
        assert!(technical_review(&story()).contains(&markers.implementation_details[0]));
    }

    #[test]
    fn estimate_prompt_template_is_not_mistaken_for_an_answer() {
        let persona = PersonaProfile::new(
            "senior_qa",
            "Michael Rodriguez",
            "Senior QA Analyst",
            7.0,
            PromptTemplate::Estimate {
                unit: EstimationUnit::PersonDays,
                scale: None,
                considerations: vec!["Regression testing impact".to_string()],
            },
        );
        let prompt = persona.render_prompt(&story());
        assert!(prompt.contains("- Person-days: [X.X]"));
        assert!(prompt.contains("- Regression testing impact"));

        let extractor = ResponseExtractor::default();
        assert_eq!(extractor.extract_numeric_field(&prompt, "Person-days", None), None);
    }
}
