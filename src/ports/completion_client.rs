//! Completion Client Port - the single network-facing dependency.
//!
//! Given a role description and a prompt, a client returns generated text
//! or a [`CompletionError`]. Review stages and estimators only ever talk to
//! a language model through this trait.
//!
//! # Example
//!
//! ```ignore
//! let request = CompletionRequest::new(persona.role_description(), persona.render_prompt(&story))
//!     .with_max_tokens(1000)
//!     .with_temperature(0.7);
//! let response = client.complete(request).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for text completion services.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generates a completion for one role description and prompt.
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, CompletionError>;

    /// Short name of the backing service, for logs.
    fn name(&self) -> &str;
}

/// Request for a single completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Sent as the system message.
    pub role_description: String,
    /// Sent as the user message.
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(role_description: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            role_description: role_description.into(),
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// Response from a completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Generated text.
    pub text: String,
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
    pub finish_reason: FinishReason,
}

impl CompletionResponse {
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
            model: model.into(),
            finish_reason: FinishReason::Stop,
        }
    }
}

/// Token usage reported by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response).
    Stop,
    /// Hit max_tokens limit.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
}

/// Completion failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompletionError {
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("service unavailable: {message}")]
    Unavailable { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    /// The service answered but the body was unusable.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl CompletionError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if a transport may retry the call.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited { .. }
                | CompletionError::Unavailable { .. }
                | CompletionError::Network(_)
                | CompletionError::Timeout { .. }
        )
    }
}
