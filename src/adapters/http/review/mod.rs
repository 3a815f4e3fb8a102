//! HTTP adapter for the story review workflow.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ErrorResponse, EstimateRequest, FeedbackRequest, HealthResponse, PersonasResponse,
    StoryPayload,
};
pub use handlers::ReviewAppState;
pub use routes::review_router;
