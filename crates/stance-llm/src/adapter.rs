//! Model invocation adapter
//!
//! Wraps a provider and turns every outcome into a [`Message`]: the
//! completion text on success, a tagged error message on failure. One
//! attempt per call.

use std::sync::Arc;
use std::time::Instant;

use stance_core::Message;
use tracing::{debug, warn};

use crate::metrics::Metrics;
use crate::provider::{LlmProvider, LlmRequest};

/// Component tag used by the study conditions
pub const STUDY_COMPONENT: &str = "api_interface";
/// Component tag used by the exploratory arm
pub const TESTER_COMPONENT: &str = "api_tester";

#[derive(Debug, Clone)]
pub struct ModelAdapter {
    provider: Arc<dyn LlmProvider>,
    component: &'static str,
    metrics: Option<Arc<Metrics>>,
}

impl ModelAdapter {
    /// Create an adapter over an injected provider
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            component: STUDY_COMPONENT,
            metrics: None,
        }
    }

    /// Tag failures with a different originating component
    pub fn with_component(mut self, component: &'static str) -> Self {
        self.component = component;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    /// Send the conversation to the provider.
    ///
    /// Never fails: a provider error becomes
    /// `Message { role: error, content: "<component> Error: <reason>" }`.
    pub async fn invoke(&self, messages: Vec<Message>, participant_id: Option<&str>) -> Message {
        let request = LlmRequest::new(messages).with_participant(participant_id);
        let turns = request.messages.len();
        let start = Instant::now();

        match self.provider.complete(request).await {
            Ok(response) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_llm_call(response.tokens_used.unwrap_or(0).into(), false);
                }
                debug!(
                    component = self.component,
                    provider = self.provider.name(),
                    model = %response.model,
                    turns,
                    latency_ms = response.latency_ms,
                    "Completion received"
                );
                Message::assistant(response.content)
            }
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_llm_call(0, true);
                }
                warn!(
                    component = self.component,
                    provider = self.provider.name(),
                    turns,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "Completion failed"
                );
                Message::error(format!("{} Error: {}", self.component, e))
            }
        }
    }

    /// Release the provider handle
    pub fn dispose(self) {
        debug!(
            component = self.component,
            provider = self.provider.name(),
            "Model adapter disposed"
        );
    }
}
