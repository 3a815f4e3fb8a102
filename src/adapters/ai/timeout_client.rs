//! Per-call timeout for any CompletionClient.
//!
//! Bounds how long one slow call can hold an estimation slot.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::ports::{CompletionClient, CompletionError, CompletionRequest, CompletionResponse};

/// Wraps a client and fails calls that run past `timeout`.
pub struct TimeoutClient {
    inner: Arc<dyn CompletionClient>,
    timeout: Duration,
}

impl TimeoutClient {
    pub fn new(inner: Arc<dyn CompletionClient>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl CompletionClient for TimeoutClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        match tokio::time::timeout(self.timeout, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(client = self.inner.name(), timeout = ?self.timeout, "Completion timed out");
                Err(CompletionError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
