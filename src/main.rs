//! story-review server binary.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use story_review::adapters::ai::{OpenAIClient, OpenAIConfig, TimeoutClient};
use story_review::adapters::http::{review_router, ReviewAppState};
use story_review::application::ReviewWorkflow;
use story_review::config::{AppConfig, ServerConfig, ValidationError};
use story_review::domain::extraction::ResponseExtractor;
use story_review::domain::persona::PersonaRegistry;
use story_review::ports::CompletionClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let workflow = build_workflow(&config)?;
    let app = review_router()
        .with_state(ReviewAppState::new(Arc::new(workflow)))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(config.server.request_timeout()))
                .layer(build_cors_layer(&config.server)),
        );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, environment = ?config.server.environment, "story-review listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` wins over the configured filter; production logs are JSON.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

fn build_workflow(config: &AppConfig) -> Result<ReviewWorkflow, Box<dyn std::error::Error>> {
    let api_key = config
        .ai
        .openai_api_key
        .clone()
        .ok_or(ValidationError::MissingRequired("STORY_REVIEW__AI__OPENAI_API_KEY"))?;

    let mut openai = OpenAIConfig::new(api_key)
        .with_model(config.ai.model.clone())
        .with_base_url(config.ai.base_url.clone())
        .with_timeout(config.ai.timeout())
        .with_max_retries(config.ai.max_retries)
        .with_retry_base_delay(config.ai.retry_base_delay())
        .with_defaults(config.ai.temperature, config.ai.max_tokens);
    if let Some(org) = &config.ai.openai_org_id {
        openai = openai.with_organization(org.clone());
    }

    // `ai.timeout_secs` bounds each HTTP attempt; the outer deadline leaves
    // room for every retry.
    let deadline = openai.call_deadline();
    let client = OpenAIClient::new(openai)?;
    let client: Arc<dyn CompletionClient> =
        Arc::new(TimeoutClient::new(Arc::new(client), deadline));

    let markers = config.workflow.load_markers()?;
    let extractor = ResponseExtractor::new(&markers)?;
    let registry = PersonaRegistry::new(config.workflow.point_scale()?);

    info!(
        model = %config.ai.model,
        call_deadline = ?deadline,
        max_concurrency = config.workflow.max_concurrency,
        custom_markers = config.workflow.markers_path.is_some(),
        "Review workflow ready"
    );

    Ok(ReviewWorkflow::new(
        client,
        Arc::new(extractor),
        Arc::new(registry),
        config.workflow.settings(&config.ai),
    ))
}

fn build_cors_layer(server: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    if origins.is_empty() {
        warn!("No CORS origins configured, allowing any origin");
        cors.allow_origin(AllowOrigin::any())
    } else {
        cors.allow_origin(origins)
    }
}
