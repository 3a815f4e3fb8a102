//! AnalysisResult - the immutable outcome of one workflow step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ReviewStageStatus, Story};
use crate::domain::estimation::TeamEstimation;
use crate::domain::foundation::{AnalysisId, Timestamp, ValidationError};

/// Extra fields pulled out of a review, keyed by field name.
pub type StructuredFields = BTreeMap<String, serde_json::Value>;

/// Result of running (or deciding on) one review stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    id: AnalysisId,
    original_story: Story,
    improved_story: Option<Story>,
    raw_text: String,
    #[serde(default)]
    structured_fields: StructuredFields,
    status: ReviewStageStatus,
    #[serde(default)]
    estimation: Option<TeamEstimation>,
    timestamp: Timestamp,
}

impl AnalysisResult {
    pub fn new(
        original_story: Story,
        improved_story: Option<Story>,
        raw_text: impl Into<String>,
        structured_fields: StructuredFields,
        status: ReviewStageStatus,
    ) -> Self {
        Self {
            id: AnalysisId::new(),
            original_story,
            improved_story,
            raw_text: raw_text.into(),
            structured_fields,
            status,
            estimation: None,
            timestamp: Timestamp::now(),
        }
    }

    /// A result in `Error` state with the failure description as its text.
    pub fn failed(original_story: Story, description: impl Into<String>) -> Self {
        Self::new(
            original_story,
            None,
            description,
            StructuredFields::new(),
            ReviewStageStatus::Error,
        )
    }

    /// Carries this result's stories forward under a new status.
    pub fn advance(&self, status: ReviewStageStatus, note: impl Into<String>) -> Self {
        Self {
            id: AnalysisId::new(),
            original_story: self.original_story.clone(),
            improved_story: self.improved_story.clone(),
            raw_text: note.into(),
            structured_fields: self.structured_fields.clone(),
            status,
            estimation: None,
            timestamp: Timestamp::now(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.structured_fields.insert(key.into(), value.into());
        self
    }

    pub fn with_estimation(mut self, estimation: TeamEstimation) -> Self {
        self.estimation = Some(estimation);
        self
    }

    pub fn id(&self) -> AnalysisId {
        self.id
    }

    pub fn original_story(&self) -> &Story {
        &self.original_story
    }

    pub fn improved_story(&self) -> Option<&Story> {
        self.improved_story.as_ref()
    }

    /// The story the next stage should work on.
    pub fn reviewed_story(&self) -> &Story {
        self.improved_story.as_ref().unwrap_or(&self.original_story)
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn structured_fields(&self) -> &StructuredFields {
        &self.structured_fields
    }

    pub fn status(&self) -> ReviewStageStatus {
        self.status
    }

    pub fn estimation(&self) -> Option<&TeamEstimation> {
        self.estimation.as_ref()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Checks a result that came back from a client.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.original_story.validate()?;
        if let Some(improved) = &self.improved_story {
            improved.validate()?;
            let expected = self.original_story.version() + 1;
            if improved.version() != expected {
                return Err(ValidationError::out_of_range(
                    "improved_story.version",
                    i64::from(expected),
                    i64::from(expected),
                    i64::from(improved.version()),
                ));
            }
        }
        Ok(())
    }
}
