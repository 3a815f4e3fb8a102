//! Completion client adapters.
//!
//! - `OpenAIClient` - chat completions over HTTP with retry
//! - `TimeoutClient` - per-call deadline around any client
//! - `MockCompletionClient` - scripted answers for tests

mod mock_client;
mod openai_client;
mod timeout_client;

pub use mock_client::MockCompletionClient;
pub use openai_client::{OpenAIClient, OpenAIConfig};
pub use timeout_client::TimeoutClient;
