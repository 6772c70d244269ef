//! Mock LLM provider for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::provider::{LlmError, LlmProvider, LlmRequest, LlmResponse};

/// A mock provider that returns canned responses and records what it was asked
#[derive(Debug)]
pub struct MockProvider {
    /// Name of this mock
    pub name: String,
    /// Canned responses (cycles through them)
    responses: Vec<String>,
    /// Failure returned on every call instead of a response
    failure: Option<String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<LlmRequest>>,
    /// Simulated latency
    latency: Duration,
}

impl MockProvider {
    /// Create a new mock provider with given responses
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            name: "mock".to_string(),
            responses,
            failure: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    /// Create a mock that always returns the same response
    pub fn constant(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// Create a mock whose every call fails with a connection error
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of completions requested so far, failed ones included
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in arrival order
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<LlmRequest> {
        self.requests().pop()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt_chars: usize = request.messages.iter().map(|m| m.content.len()).sum();
        match self.requests.lock() {
            Ok(mut guard) => guard.push(request),
            Err(poisoned) => poisoned.into_inner().push(request),
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(reason) = &self.failure {
            return Err(LlmError::ConnectionFailed(reason.clone()));
        }
        if self.responses.is_empty() {
            return Err(LlmError::InvalidResponse("mock has no responses".to_string()));
        }

        Ok(LlmResponse {
            content: self.responses[idx % self.responses.len()].clone(),
            model: self.model().to_string(),
            tokens_used: Some((prompt_chars / 4) as u32 + 100),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stance_core::Message;

    #[tokio::test]
    async fn test_mock_cycles_responses() {
        let mock = MockProvider::new(vec!["eins".to_string(), "zwei".to_string()]);
        let mut seen = Vec::new();
        for _ in 0..3 {
            let response = mock
                .complete(LlmRequest::new(vec![Message::user("hallo")]))
                .await
                .unwrap();
            seen.push(response.content);
        }
        assert_eq!(seen, ["eins", "zwei", "eins"]);
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failing_mock_records_request() {
        let mock = MockProvider::failing("network unreachable");
        let request = LlmRequest::new(vec![Message::user("hallo")]).with_participant(Some("p1"));
        let err = mock.complete(request.clone()).await.unwrap_err();
        assert_eq!(err, LlmError::ConnectionFailed("network unreachable".to_string()));
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.last_request(), Some(request));
    }
}
