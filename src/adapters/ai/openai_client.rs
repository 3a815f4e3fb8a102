//! OpenAI Client - CompletionClient over the chat completions API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gpt-4")
//!     .with_organization("org-123");
//!
//! let client = OpenAIClient::new(config)?;
//! ```
//!
//! Retryable failures are retried with exponential backoff up to
//! `max_retries` times. Callers above this adapter never retry.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::ports::{
    CompletionClient, CompletionError, CompletionRequest, CompletionResponse, FinishReason,
    TokenUsage,
};

/// Configuration for the OpenAI client.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: Secret<String>,
    organization: Option<String>,
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// HTTP-level request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
    /// First backoff delay; doubles on every retry.
    pub retry_base_delay: Duration,
    /// Used when a request leaves temperature unset.
    pub default_temperature: f32,
    /// Used when a request leaves max_tokens unset.
    pub default_max_tokens: u32,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            organization: None,
            model: "gpt-4".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            default_temperature: 0.7,
            default_max_tokens: 1000,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sends `OpenAI-Organization` with every request.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn with_defaults(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.default_temperature = temperature;
        self.default_max_tokens = max_tokens;
        self
    }

    /// Longest one `complete` call can take: every attempt running to
    /// `timeout` plus every backoff sleep in between.
    pub fn call_deadline(&self) -> Duration {
        let attempts = self.timeout * (self.max_retries + 1);
        let backoff: Duration = (0..self.max_retries)
            .map(|retry| backoff_delay(self.retry_base_delay, retry))
            .sum();
        attempts + backoff
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI chat completions client.
pub struct OpenAIClient {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIClient {
    pub fn new(config: OpenAIConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::InvalidRequest(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        OpenAIRequest {
            model: self.config.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: request.role_description.clone(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                },
            ],
            max_tokens: request.max_tokens.unwrap_or(self.config.default_max_tokens),
            temperature: request.temperature.unwrap_or(self.config.default_temperature),
        }
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, CompletionError> {
        let mut builder = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json");
        if let Some(org) = &self.config.organization {
            builder = builder.header("OpenAI-Organization", org);
        }

        builder
            .json(&self.to_openai_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    CompletionError::network(format!("Connection failed: {}", e))
                } else {
                    CompletionError::network(e.to_string())
                }
            })
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, CompletionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(CompletionError::AuthenticationFailed),
            429 => Err(CompletionError::rate_limited(parse_retry_after(&error_body))),
            400 | 404 | 422 => Err(CompletionError::InvalidRequest(error_body)),
            500..=599 => Err(CompletionError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(CompletionError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, CompletionError> {
        let response = self.handle_response_status(response).await?;

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::parse(format!("Failed to parse response: {}", e)))?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::parse("No choices in response"))?;

        let text = choice
            .message
            .content
            .ok_or_else(|| CompletionError::parse("Choice has no content"))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        let usage = openai_response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            text,
            usage,
            model: openai_response.model,
            finish_reason,
        })
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<CompletionResponse, CompletionError> {
        let response = self.send_request(request).await?;
        self.parse_response(response).await
    }
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let mut retry_count = 0;

        loop {
            match self.attempt(&request).await {
                Ok(completion) => {
                    debug!(
                        model = %completion.model,
                        total_tokens = completion.usage.total_tokens,
                        "OpenAI completion received"
                    );
                    return Ok(completion);
                }
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    let delay = backoff_delay(self.config.retry_base_delay, retry_count);
                    warn!(error = %err, retry = retry_count + 1, ?delay, "Retrying OpenAI request");
                    sleep(delay).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Exponential backoff: base, 2x base, 4x base, ...
fn backoff_delay(base: Duration, retry: u32) -> Duration {
    base * (1u32 << retry.min(16))
}

/// Reads "try again in Xs" out of a rate limit body, defaulting to 30.
fn parse_retry_after(error_body: &str) -> u32 {
    serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|parsed| {
            let message = parsed.get("error")?.get("message")?.as_str()?.to_string();
            let rest = &message[message.find("try again in ")? + "try again in ".len()..];
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u32>().ok()
        })
        .unwrap_or(30)
}

// ════════════════════════════════════════════════════════════════════════════════
// OpenAI API Types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: String,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::TimeoutClient;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn config_builder_works() {
        let config = OpenAIConfig::new("test-key")
            .with_model("gpt-4o")
            .with_organization("org-1")
            .with_base_url("https://custom.api.com")
            .with_timeout(Duration::from_secs(30))
            .with_max_retries(5)
            .with_defaults(0.2, 500);

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.organization.as_deref(), Some("org-1"));
        assert_eq!(config.base_url, "https://custom.api.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.default_max_tokens, 500);
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn request_uses_system_and_user_messages() {
        let client = OpenAIClient::new(OpenAIConfig::new("k")).unwrap();
        let body = client.to_openai_request(&CompletionRequest::new("role", "prompt"));

        assert_eq!(body.model, "gpt-4");
        assert_eq!(body.messages[0].role, "system");
        assert_eq!(body.messages[0].content, "role");
        assert_eq!(body.messages[1].role, "user");
        assert_eq!(body.max_tokens, 1000);
        assert_eq!(body.temperature, 0.7);
    }

    #[test]
    fn request_overrides_defaults() {
        let client = OpenAIClient::new(OpenAIConfig::new("k")).unwrap();
        let body = client.to_openai_request(
            &CompletionRequest::new("r", "p").with_max_tokens(50).with_temperature(0.0),
        );
        assert_eq!(body.max_tokens, 50);
        assert_eq!(body.temperature, 0.0);
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let client =
            OpenAIClient::new(OpenAIConfig::new("k").with_base_url("http://localhost:1/v1/")).unwrap();
        assert_eq!(client.completions_url(), "http://localhost:1/v1/chat/completions");
    }

    #[test]
    fn retry_after_is_parsed_from_message() {
        let body = r#"{"error":{"message":"Rate limit reached. Please try again in 12s."}}"#;
        assert_eq!(parse_retry_after(body), 12);
        assert_eq!(parse_retry_after("not json"), 30);
    }

    /// Serves `/v1/chat/completions`, failing the first `failures` calls with `status`.
    async fn fake_openai(failures: usize, status: StatusCode) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    |State((hits, failures, status)): State<(Arc<AtomicUsize>, usize, StatusCode)>,
                     Json(body): Json<serde_json::Value>| async move {
                        let n = hits.fetch_add(1, Ordering::SeqCst);
                        if n < failures {
                            return (status, Json(serde_json::json!({"error": {"message": "nope"}})));
                        }
                        let system = body["messages"][0]["content"].as_str().unwrap_or("").to_string();
                        (
                            StatusCode::OK,
                            Json(serde_json::json!({
                                "model": "gpt-4-0613",
                                "choices": [{
                                    "message": {"role": "assistant", "content": format!("echo: {}", system)},
                                    "finish_reason": "stop"
                                }],
                                "usage": {"prompt_tokens": 12, "completion_tokens": 3}
                            })),
                        )
                    },
                ),
            )
            .with_state((hits.clone(), failures, status));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v1", addr), hits)
    }

    fn client_for(base_url: String, retries: u32) -> OpenAIClient {
        OpenAIClient::new(
            OpenAIConfig::new("test-key")
                .with_base_url(base_url)
                .with_max_retries(retries)
                .with_retry_base_delay(Duration::from_millis(5)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn completes_against_server() {
        let (url, hits) = fake_openai(0, StatusCode::OK).await;
        let response = client_for(url, 0)
            .complete(CompletionRequest::new("You are an experienced Agile Coach.", "p"))
            .await
            .unwrap();

        assert_eq!(response.text, "echo: You are an experienced Agile Coach.");
        assert_eq!(response.model, "gpt-4-0613");
        assert_eq!(response.usage.total_tokens, 15);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_unavailable_then_succeeds() {
        let (url, hits) = fake_openai(2, StatusCode::SERVICE_UNAVAILABLE).await;
        let response = client_for(url, 3)
            .complete(CompletionRequest::new("r", "p"))
            .await
            .unwrap();

        assert_eq!(response.text, "echo: r");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let (url, hits) = fake_openai(10, StatusCode::SERVICE_UNAVAILABLE).await;
        let err = client_for(url, 2)
            .complete(CompletionRequest::new("r", "p"))
            .await
            .unwrap_err();

        assert!(matches!(err, CompletionError::Unavailable { .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_auth_failures() {
        let (url, hits) = fake_openai(10, StatusCode::UNAUTHORIZED).await;
        let err = client_for(url, 3)
            .complete(CompletionRequest::new("r", "p"))
            .await
            .unwrap_err();

        assert_eq!(err, CompletionError::AuthenticationFailed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn call_deadline_covers_every_attempt_and_backoff() {
        let config = OpenAIConfig::new("k")
            .with_timeout(Duration::from_secs(10))
            .with_max_retries(2)
            .with_retry_base_delay(Duration::from_secs(1));

        // 3 attempts of 10s plus 1s and 2s of backoff.
        assert_eq!(config.call_deadline(), Duration::from_secs(33));
    }

    /// Serves `/v1/chat/completions`, stalling the first call for `stall`.
    async fn stalling_openai(stall: Duration) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(move |State(hits): State<Arc<AtomicUsize>>| async move {
                    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                        sleep(stall).await;
                    }
                    Json(serde_json::json!({
                        "model": "gpt-4-0613",
                        "choices": [{
                            "message": {"role": "assistant", "content": "on time"},
                            "finish_reason": "stop"
                        }],
                        "usage": {"prompt_tokens": 1, "completion_tokens": 1}
                    }))
                }),
            )
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v1", addr), hits)
    }

    #[tokio::test]
    async fn timed_out_attempt_is_retried_inside_call_deadline() {
        let (url, hits) = stalling_openai(Duration::from_millis(800)).await;
        let config = OpenAIConfig::new("test-key")
            .with_base_url(url)
            .with_timeout(Duration::from_millis(200))
            .with_max_retries(2)
            .with_retry_base_delay(Duration::from_millis(5));
        let deadline = config.call_deadline();
        let client = TimeoutClient::new(Arc::new(OpenAIClient::new(config).unwrap()), deadline);

        let response = client
            .complete(CompletionRequest::new("r", "p"))
            .await
            .unwrap();

        assert_eq!(response.text, "on time");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
