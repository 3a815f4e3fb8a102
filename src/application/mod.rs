//! Application layer - review orchestration.
//!
//! Coordinates the domain types with the completion port:
//! - `StageRunner` runs one persona for one review stage
//! - `EstimationAggregator` fans a story out to the estimation team
//! - `ReviewWorkflow` moves results through the stage state machine

mod estimation;
mod stage_runner;
mod workflow;

pub use estimation::{EstimationAggregator, DEFAULT_MAX_CONCURRENCY};
pub use stage_runner::{CompletionSettings, StageRunner};
pub use workflow::{
    RejectionPolicy, ReviewWorkflow, UserFeedback, WorkflowError, WorkflowSettings,
};
