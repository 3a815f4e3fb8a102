//! HTTP DTOs for review endpoints
//!
//! Results and estimations go out in their domain serde shape; only the
//! request side and the roster listing get dedicated types.

use serde::{Deserialize, Serialize};

use crate::domain::estimation::EstimationUnit;
use crate::domain::persona::PersonaProfile;
use crate::domain::story::{AnalysisResult, Story};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A story as submitted by a client.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryPayload {
    pub story: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub context: String,
}

impl StoryPayload {
    /// A version-1 story; validation happens in the workflow.
    pub fn into_story(self) -> Story {
        Story::new(self.story, self.acceptance_criteria, self.context)
    }
}

/// Request to approve or reject a finished review stage
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub analysis_result: AnalysisResult,
    pub approved: bool,
    #[serde(default)]
    pub edited_story: Option<StoryPayload>,
    /// Unit for a team estimation run on final approval.
    #[serde(default)]
    pub estimate: Option<EstimationUnit>,
}

/// Request to estimate a story with the whole team
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateRequest {
    pub story: StoryPayload,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Roster metadata for clients
#[derive(Debug, Clone, Serialize)]
pub struct PersonasResponse {
    pub reviewers: Vec<PersonaProfile>,
    pub person_days: Vec<PersonaProfile>,
    pub story_points: Vec<PersonaProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            code: "CONFLICT".to_string(),
            message: message.into(),
        }
    }
}
