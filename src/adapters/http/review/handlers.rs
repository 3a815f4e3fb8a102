//! HTTP handlers for review endpoints
//!
//! These handlers translate JSON bodies into workflow calls. A failed
//! completion is not an HTTP error: it comes back as a 200 carrying a
//! result in `error` state.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{ReviewWorkflow, UserFeedback, WorkflowError};
use crate::domain::estimation::{EstimationUnit, TeamEstimation};

use super::dto::{
    ErrorResponse, EstimateRequest, FeedbackRequest, HealthResponse, PersonasResponse,
    StoryPayload,
};

type ApiError = (StatusCode, Json<ErrorResponse>);

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct ReviewAppState {
    pub workflow: Arc<ReviewWorkflow>,
}

impl ReviewAppState {
    pub fn new(workflow: Arc<ReviewWorkflow>) -> Self {
        Self { workflow }
    }
}

fn map_workflow_error(err: WorkflowError) -> ApiError {
    match err {
        WorkflowError::InvalidInput(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(err.to_string())),
        ),
        WorkflowError::NotAwaitingFeedback(_) | WorkflowError::InvalidTransition { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::conflict(err.to_string())),
        ),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// Start a review with the agile stage
///
/// POST /api/analyze
pub async fn analyze_story(
    State(app_state): State<ReviewAppState>,
    Json(req): Json<StoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let result = app_state
        .workflow
        .start_analysis(req.into_story())
        .await
        .map_err(map_workflow_error)?;

    Ok((StatusCode::OK, Json(result)))
}

/// Approve or reject the stage a result is waiting on
///
/// POST /api/analyze/feedback
pub async fn submit_feedback(
    State(app_state): State<ReviewAppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let feedback = UserFeedback {
        approved: req.approved,
        edited_story: req.edited_story.map(StoryPayload::into_story),
        estimate: req.estimate,
    };

    let result = app_state
        .workflow
        .apply_feedback(&req.analysis_result, feedback)
        .await
        .map_err(map_workflow_error)?;

    Ok((StatusCode::OK, Json(result)))
}

/// POST /api/estimate/days
pub async fn estimate_days(
    State(app_state): State<ReviewAppState>,
    Json(req): Json<EstimateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    estimate(&app_state, req, EstimationUnit::PersonDays).await
}

/// POST /api/estimate/points
pub async fn estimate_points(
    State(app_state): State<ReviewAppState>,
    Json(req): Json<EstimateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    estimate(&app_state, req, EstimationUnit::StoryPoints).await
}

async fn estimate(
    app_state: &ReviewAppState,
    req: EstimateRequest,
    unit: EstimationUnit,
) -> Result<(StatusCode, Json<TeamEstimation>), ApiError> {
    let story = req.story.into_story();
    let estimation = app_state
        .workflow
        .estimate_team_in(&story, unit)
        .await
        .map_err(map_workflow_error)?;

    Ok((StatusCode::OK, Json(estimation)))
}

/// List reviewers and both estimation teams
///
/// GET /api/personas
pub async fn list_personas(State(app_state): State<ReviewAppState>) -> impl IntoResponse {
    let registry = app_state.workflow.registry();
    Json(PersonasResponse {
        reviewers: vec![
            registry.agile_coach().clone(),
            registry.senior_developer().clone(),
        ],
        person_days: registry.team(EstimationUnit::PersonDays).to_vec(),
        story_points: registry.team(EstimationUnit::StoryPoints).to_vec(),
    })
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockCompletionClient;
    use crate::application::WorkflowSettings;
    use crate::domain::extraction::ResponseExtractor;
    use crate::domain::persona::PersonaRegistry;
    use crate::domain::story::{AnalysisResult, ReviewStageStatus, Story};

    fn test_app_state(client: MockCompletionClient) -> ReviewAppState {
        let workflow = ReviewWorkflow::new(
            Arc::new(client),
            Arc::new(ResponseExtractor::default()),
            Arc::new(PersonaRegistry::default()),
            WorkflowSettings::default(),
        );
        ReviewAppState::new(Arc::new(workflow))
    }

    fn payload(text: &str) -> StoryPayload {
        StoryPayload {
            story: text.to_string(),
            acceptance_criteria: vec!["It works".to_string()],
            context: String::new(),
        }
    }

    #[tokio::test]
    async fn test_analyze_story_handler() {
        let app_state = test_app_state(
            MockCompletionClient::new().with_response("Improved Story:\nAs a user I sign in"),
        );

        let result = analyze_story(State(app_state), Json(payload("As a user I log in"))).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_analyze_blank_story_is_bad_request() {
        let client = MockCompletionClient::new();
        let app_state = test_app_state(client.clone());

        let result = analyze_story(State(app_state), Json(payload("   "))).await;
        let (status, body) = result.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "BAD_REQUEST");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_feedback_on_finished_result_is_conflict() {
        let app_state = test_app_state(MockCompletionClient::new());
        let finished = AnalysisResult::failed(Story::new("As a user", vec![], ""), "boom");
        assert_eq!(finished.status(), ReviewStageStatus::Error);

        let req = FeedbackRequest {
            analysis_result: finished,
            approved: true,
            edited_story: None,
            estimate: None,
        };
        let (status, _) = submit_feedback(State(app_state), Json(req))
            .await
            .err()
            .unwrap();
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_estimate_blank_story_is_bad_request() {
        let app_state = test_app_state(MockCompletionClient::new());

        let req = EstimateRequest { story: payload("") };
        let (status, _) = estimate(&app_state, req, EstimationUnit::PersonDays)
            .await
            .err()
            .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
