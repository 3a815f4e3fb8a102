//! Ports - interfaces to the outside world.
//!
//! The review core depends only on [`CompletionClient`]; adapters provide
//! the real and test implementations.

mod completion_client;

pub use completion_client::{
    CompletionClient, CompletionError, CompletionRequest, CompletionResponse, FinishReason,
    TokenUsage,
};
