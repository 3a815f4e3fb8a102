//! Mock completion client for testing.
//!
//! # Features
//!
//! - Queued responses, consumed in call order
//! - Routed responses picked by a substring of the role description or prompt
//! - Error injection and simulated latency
//! - Call recording and peak-concurrency tracking
//!
//! # Example
//!
//! ```ignore
//! let client = MockCompletionClient::new()
//!     .with_response("Improved Story: As a user ...")
//!     .with_routed_error("Junior QA", CompletionError::network("reset"))
//!     .with_delay(Duration::from_millis(20));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    CompletionClient, CompletionError, CompletionRequest, CompletionResponse, FinishReason,
    TokenUsage,
};

const MOCK_MODEL: &str = "mock-model-1";

type MockResult = Result<String, CompletionError>;

/// Mock completion client.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionClient {
    /// Consumed in order when no route matches.
    responses: Arc<Mutex<VecDeque<MockResult>>>,
    /// Reusable answers keyed by a substring of the request.
    routes: Arc<Mutex<Vec<(String, MockResult)>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Adds an error to the queue.
    pub fn with_error(self, error: CompletionError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Answers every request whose role description or prompt contains `needle`.
    pub fn with_routed_response(self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((needle.into(), Ok(text.into())));
        self
    }

    /// Fails every request whose role description or prompt contains `needle`.
    pub fn with_routed_error(self, needle: impl Into<String>, error: CompletionError) -> Self {
        self.routes.lock().unwrap().push((needle.into(), Err(error)));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of calls that were in progress at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn next_result(&self, request: &CompletionRequest) -> MockResult {
        let routed = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| {
                request.role_description.contains(needle.as_str())
                    || request.prompt.contains(needle.as_str())
            })
            .map(|(_, result)| result.clone());

        routed.unwrap_or_else(|| {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("Mock response".to_string()))
        })
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let result = self.next_result(&request);
        self.calls.lock().unwrap().push(request);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        result.map(|text| CompletionResponse {
            usage: TokenUsage::new(10, (text.len() / 4) as u32),
            text,
            model: MOCK_MODEL.to_string(),
            finish_reason: FinishReason::Stop,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
