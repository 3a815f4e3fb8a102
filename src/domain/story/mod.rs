//! Story module - the work item under review and per-stage results.

mod analysis;
mod status;
mod story;

pub use analysis::{AnalysisResult, StructuredFields};
pub use status::ReviewStageStatus;
pub use story::Story;
