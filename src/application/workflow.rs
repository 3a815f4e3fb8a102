//! ReviewWorkflow - drives a story through the review stages.
//!
//! ```text
//! Pending -> AgileReview -> UserReviewAgile -> TechnicalReview -> UserReviewFinal -> Complete
//!               |                 |                  |                  |
//!               +----> Error <----+------------------+------------------+
//!                                 |                                     |
//!                                 +-----> Pending (edited story) <------+
//! ```
//!
//! Every call takes the latest [`AnalysisResult`] and returns a new one; the
//! workflow itself keeps no per-story state.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::estimation::EstimationAggregator;
use super::stage_runner::{CompletionSettings, StageRunner};
use crate::domain::estimation::{EstimationUnit, TeamEstimation};
use crate::domain::extraction::{normalize_story, ResponseExtractor};
use crate::domain::foundation::{StateMachine, ValidationError};
use crate::domain::persona::PersonaRegistry;
use crate::domain::story::{AnalysisResult, ReviewStageStatus, Story};
use crate::ports::CompletionClient;

/// Errors returned to workflow callers.
///
/// Completion failures and user rejections are not errors here; they come
/// back as results in `Error` state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("result in state '{0}' is not awaiting feedback")]
    NotAwaitingFeedback(ReviewStageStatus),

    #[error("cannot move from '{from}' to '{to}'")]
    InvalidTransition {
        from: ReviewStageStatus,
        to: ReviewStageStatus,
    },
}

/// What happens when the technical review is rejected without an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RejectionPolicy {
    /// The workflow ends in `Error`.
    #[default]
    HardError,
    /// The reviewed story is handed back in a `Pending` result.
    ReturnToInput,
}

/// A user's decision on a finished stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFeedback {
    pub approved: bool,
    pub edited_story: Option<Story>,
    /// Run a team estimation when approving the technical review.
    pub estimate: Option<EstimationUnit>,
}

impl UserFeedback {
    pub fn approve() -> Self {
        Self {
            approved: true,
            ..Self::default()
        }
    }

    pub fn reject() -> Self {
        Self::default()
    }

    pub fn reject_with_edit(edited: Story) -> Self {
        Self {
            approved: false,
            edited_story: Some(edited),
            estimate: None,
        }
    }

    pub fn with_estimate(mut self, unit: EstimationUnit) -> Self {
        self.estimate = Some(unit);
        self
    }
}

/// Knobs for building a [`ReviewWorkflow`].
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSettings {
    pub completion: CompletionSettings,
    pub max_concurrency: usize,
    pub default_unit: EstimationUnit,
    pub rejection_policy: RejectionPolicy,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            completion: CompletionSettings::default(),
            max_concurrency: super::estimation::DEFAULT_MAX_CONCURRENCY,
            default_unit: EstimationUnit::PersonDays,
            rejection_policy: RejectionPolicy::HardError,
        }
    }
}

/// Orchestrates review stages and user decisions.
#[derive(Clone)]
pub struct ReviewWorkflow {
    registry: Arc<PersonaRegistry>,
    runner: StageRunner,
    aggregator: EstimationAggregator,
    default_unit: EstimationUnit,
    rejection_policy: RejectionPolicy,
}

impl ReviewWorkflow {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        extractor: Arc<ResponseExtractor>,
        registry: Arc<PersonaRegistry>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            runner: StageRunner::new(client.clone(), extractor.clone(), settings.completion),
            aggregator: EstimationAggregator::new(
                client,
                extractor,
                settings.completion,
                settings.max_concurrency,
            ),
            registry,
            default_unit: settings.default_unit,
            rejection_policy: settings.rejection_policy,
        }
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    pub fn default_unit(&self) -> EstimationUnit {
        self.default_unit
    }

    /// Starts a new workflow with an agile review of `story`.
    ///
    /// Blank stories are rejected before any completion call.
    pub async fn start_analysis(&self, story: Story) -> Result<AnalysisResult, WorkflowError> {
        story.validate()?;
        info!(story_version = story.version(), "Starting story analysis");

        self.transition(ReviewStageStatus::Pending, ReviewStageStatus::AgileReview)?;
        let result = self
            .runner
            .run_stage(self.registry.agile_coach(), &story, ReviewStageStatus::AgileReview)
            .await;
        self.note_failure(ReviewStageStatus::AgileReview, &result);

        Ok(result)
    }

    /// Applies an approve or reject decision without estimation.
    pub async fn process_user_feedback(
        &self,
        result: &AnalysisResult,
        approved: bool,
        edited_story: Option<Story>,
    ) -> Result<AnalysisResult, WorkflowError> {
        self.apply_feedback(
            result,
            UserFeedback {
                approved,
                edited_story,
                estimate: None,
            },
        )
        .await
    }

    /// Applies a user's decision to a result awaiting one.
    pub async fn apply_feedback(
        &self,
        result: &AnalysisResult,
        feedback: UserFeedback,
    ) -> Result<AnalysisResult, WorkflowError> {
        result.validate()?;

        let stage = result.status();
        let decision = match stage {
            ReviewStageStatus::AgileReview => ReviewStageStatus::UserReviewAgile,
            ReviewStageStatus::TechnicalReview => ReviewStageStatus::UserReviewFinal,
            other => return Err(WorkflowError::NotAwaitingFeedback(other)),
        };
        self.transition(stage, decision)?;

        match (feedback.approved, feedback.edited_story) {
            (true, _) => self.approve(result, decision, feedback.estimate).await,
            (false, Some(edited)) => {
                let restarted = result.original_story().from_edit(&edited);
                restarted.validate()?;
                self.transition(decision, ReviewStageStatus::Pending)?;
                info!(
                    from_version = result.original_story().version(),
                    to_version = restarted.version(),
                    "Restarting review with edited story"
                );
                self.start_analysis(restarted).await
            }
            (false, None) => self.reject(result, decision),
        }
    }

    /// Runs a team estimation in the default unit.
    pub async fn estimate_team(&self, story: &Story) -> Result<TeamEstimation, WorkflowError> {
        self.estimate_team_in(story, self.default_unit).await
    }

    pub async fn estimate_team_in(
        &self,
        story: &Story,
        unit: EstimationUnit,
    ) -> Result<TeamEstimation, WorkflowError> {
        story.validate()?;
        Ok(self.aggregator.estimate(story, self.registry.team(unit)).await)
    }

    async fn approve(
        &self,
        result: &AnalysisResult,
        decision: ReviewStageStatus,
        estimate: Option<EstimationUnit>,
    ) -> Result<AnalysisResult, WorkflowError> {
        let story = next_stage_story(result);

        if decision == ReviewStageStatus::UserReviewAgile {
            self.transition(decision, ReviewStageStatus::TechnicalReview)?;
            let technical = self
                .runner
                .run_stage(
                    self.registry.senior_developer(),
                    &story,
                    ReviewStageStatus::TechnicalReview,
                )
                .await;
            self.note_failure(ReviewStageStatus::TechnicalReview, &technical);
            return Ok(technical);
        }

        self.transition(decision, ReviewStageStatus::Complete)?;
        let complete = result.advance(ReviewStageStatus::Complete, result.raw_text());
        match estimate {
            Some(unit) => {
                let estimation = self.estimate_team_in(&story, unit).await?;
                Ok(complete.with_estimation(estimation))
            }
            None => Ok(complete),
        }
    }

    fn reject(
        &self,
        result: &AnalysisResult,
        decision: ReviewStageStatus,
    ) -> Result<AnalysisResult, WorkflowError> {
        if decision == ReviewStageStatus::UserReviewFinal
            && self.rejection_policy == RejectionPolicy::ReturnToInput
        {
            self.transition(decision, ReviewStageStatus::Pending)?;
            return Ok(result.advance(
                ReviewStageStatus::Pending,
                "Technical review rejected; story returned for editing",
            ));
        }

        self.transition(decision, ReviewStageStatus::Error)?;
        let stage = if decision == ReviewStageStatus::UserReviewAgile {
            "Agile"
        } else {
            "Technical"
        };
        Ok(result
            .advance(
                ReviewStageStatus::Error,
                format!("{} review rejected by user without an edited story", stage),
            )
            .with_field("error_kind", "user_rejection"))
    }

    fn transition(
        &self,
        from: ReviewStageStatus,
        to: ReviewStageStatus,
    ) -> Result<ReviewStageStatus, WorkflowError> {
        let next = from
            .transition_to(to)
            .map_err(|_| WorkflowError::InvalidTransition { from, to })?;
        debug!(%from, %to, "Workflow transition");
        Ok(next)
    }

    fn note_failure(&self, stage: ReviewStageStatus, result: &AnalysisResult) {
        if result.status() == ReviewStageStatus::Error {
            debug!(from = %stage, to = %ReviewStageStatus::Error, "Workflow transition");
        }
    }
}

/// The story handed to the next stage or to the estimators.
///
/// Falls back to the stage's input when cleanup leaves the reviewed story
/// without text.
fn next_stage_story(result: &AnalysisResult) -> Story {
    let reviewed = normalize_story(result.reviewed_story());
    if reviewed.validate().is_ok() {
        return reviewed;
    }

    warn!(
        version = reviewed.version(),
        "Reviewed story is empty after cleanup; continuing with the stage input"
    );
    let input = normalize_story(result.original_story());
    if input.validate().is_ok() {
        input
    } else {
        result.original_story().clone()
    }
}
