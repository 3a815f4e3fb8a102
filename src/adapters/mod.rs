//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Completion clients (OpenAI, timeout wrapper, mock)
//! - `http` - Axum routes exposing the review workflow

pub mod ai;
pub mod http;

pub use ai::{MockCompletionClient, OpenAIClient, OpenAIConfig, TimeoutClient};
pub use http::{review_router, ReviewAppState};
