//! Route definitions for review endpoints

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    analyze_story, estimate_days, estimate_points, health, list_personas, submit_feedback,
    ReviewAppState,
};

/// Create the review router with all endpoints
///
/// # Endpoints
///
/// - `POST /api/analyze` - Run the agile review on a new story
/// - `POST /api/analyze/feedback` - Approve or reject the current stage
/// - `POST /api/estimate/days` - Team estimate in person-days
/// - `POST /api/estimate/points` - Team estimate in story points
/// - `GET /api/personas` - Reviewer and estimator roster
/// - `GET /health` - Liveness check
pub fn review_router() -> Router<ReviewAppState> {
    Router::new()
        .route("/api/analyze", post(analyze_story))
        .route("/api/analyze/feedback", post(submit_feedback))
        .route("/api/estimate/days", post(estimate_days))
        .route("/api/estimate/points", post(estimate_points))
        .route("/api/personas", get(list_personas))
        .route("/health", get(health))
}
