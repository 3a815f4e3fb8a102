//! Story value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

fn first_version() -> u32 {
    1
}

/// A user story with its acceptance criteria.
///
/// Stories are never edited in place. Rewrites produce a new value with the
/// version bumped by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    text: String,
    #[serde(default)]
    acceptance_criteria: Vec<String>,
    #[serde(default)]
    context: String,
    #[serde(default = "first_version")]
    version: u32,
}

impl Story {
    /// Creates a first-version story.
    pub fn new(
        text: impl Into<String>,
        acceptance_criteria: Vec<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            acceptance_criteria,
            context: context.into(),
            version: first_version(),
        }
    }

    /// Produces the next version with new text and criteria, same context.
    pub fn revision(&self, text: impl Into<String>, acceptance_criteria: Vec<String>) -> Self {
        Self {
            text: text.into(),
            acceptance_criteria,
            context: self.context.clone(),
            version: self.version + 1,
        }
    }

    /// Turns a user edit into the next version of this story.
    ///
    /// The version supplied by the caller is ignored. An empty context on
    /// the edit keeps the current one.
    pub fn from_edit(&self, edited: &Story) -> Self {
        let context = if edited.context.trim().is_empty() {
            self.context.clone()
        } else {
            edited.context.clone()
        };

        Self {
            text: edited.text.clone(),
            acceptance_criteria: edited.acceptance_criteria.clone(),
            context,
            version: self.version + 1,
        }
    }

    /// Replaces text and criteria without bumping the version.
    pub(crate) fn with_content(&self, text: String, acceptance_criteria: Vec<String>) -> Self {
        Self {
            text,
            acceptance_criteria,
            context: self.context.clone(),
            version: self.version,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn acceptance_criteria(&self) -> &[String] {
        &self.acceptance_criteria
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Checks the story can be sent for review.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::empty_field("story.text"));
        }
        if self.version == 0 {
            return Err(ValidationError::out_of_range(
                "story.version",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }
        Ok(())
    }

    /// Criteria as a bulleted block for prompts.
    pub fn formatted_criteria(&self) -> String {
        if self.acceptance_criteria.is_empty() {
            return "None provided".to_string();
        }
        self.acceptance_criteria
            .iter()
            .map(|c| format!("- {}", c))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story() -> Story {
        Story::new(
            "passwords reset every 90 days",
            vec!["notice must be given".to_string()],
            "security audits",
        )
    }

    #[test]
    fn new_story_is_version_one() {
        assert_eq!(story().version(), 1);
    }

    #[test]
    fn revision_bumps_version_and_keeps_context() {
        let next = story().revision("better", vec![]);
        assert_eq!(next.version(), 2);
        assert_eq!(next.context(), "security audits");
        assert_eq!(next.text(), "better");
    }

    #[test]
    fn from_edit_ignores_caller_version() {
        let mut edited = Story::new("edited", vec!["x".to_string()], "");
        edited.version = 42;
        let next = story().from_edit(&edited);

        assert_eq!(next.version(), 2);
        assert_eq!(next.context(), "security audits");
        assert_eq!(next.acceptance_criteria(), &["x".to_string()]);
    }

    #[test]
    fn from_edit_takes_new_context_when_given() {
        let edited = Story::new("edited", vec![], "compliance");
        assert_eq!(story().from_edit(&edited).context(), "compliance");
    }

    #[test]
    fn validate_rejects_blank_text() {
        let err = Story::new("   ", vec![], "").validate().unwrap_err();
        assert_eq!(err.field(), "story.text");
    }

    #[test]
    fn validate_rejects_version_zero() {
        let mut s = story();
        s.version = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn formatted_criteria_lists_bullets() {
        assert_eq!(story().formatted_criteria(), "- notice must be given");
        assert_eq!(Story::new("t", vec![], "").formatted_criteria(), "None provided");
    }

    #[test]
    fn deserializes_with_defaults() {
        let s: Story = serde_json::from_str(r#"{"text":"t"}"#).unwrap();
        assert_eq!(s.version(), 1);
        assert!(s.acceptance_criteria().is_empty());
        assert_eq!(s.context(), "");
    }
}
