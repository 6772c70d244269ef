//! Exploratory arm
//!
//! Researchers try the exploratory instruction against their own key and
//! model. Every turn gets a freshly built provider that is dropped when the
//! turn ends.

use std::fmt;
use std::sync::Arc;

use stance_core::{advance, Condition, CoreError, Message, Position, Thesis, ThesisId, Turn};
use stance_llm::{LlmProvider, ModelAdapter, OpenAIProvider};
use tracing::{info, instrument};

use crate::orchestrator::finish;

/// Builds a provider from caller-supplied credentials
pub trait ProviderFactory: Send + Sync + fmt::Debug {
    fn create(&self, api_key: &str, model: &str) -> Arc<dyn LlmProvider>;
}

/// Factory for OpenAI-compatible endpoints
#[derive(Debug, Clone)]
pub struct OpenAIFactory {
    base_url: String,
}

impl OpenAIFactory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for OpenAIFactory {
    fn default() -> Self {
        Self::new(stance_llm::openai::DEFAULT_BASE_URL)
    }
}

impl ProviderFactory for OpenAIFactory {
    fn create(&self, api_key: &str, model: &str) -> Arc<dyn LlmProvider> {
        Arc::new(OpenAIProvider::new(api_key, model).with_base_url(&self.base_url))
    }
}

/// One exploratory turn
#[derive(Clone)]
pub struct ExploratoryTurn {
    /// Free thesis text; not resolved against the catalog
    pub thesis_text: String,
    pub position: Position,
    pub statement: String,
    /// Prior transcript; empty on the first turn
    pub history: Vec<Message>,
    pub api_key: String,
    pub model: String,
}

impl fmt::Debug for ExploratoryTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExploratoryTurn")
            .field("thesis_text", &self.thesis_text)
            .field("position", &self.position)
            .field("history_len", &self.history.len())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Explorer {
    factory: Arc<dyn ProviderFactory>,
}

impl Explorer {
    pub fn new(factory: Arc<dyn ProviderFactory>) -> Self {
        Self { factory }
    }

    /// Run one turn. Failures from the caller's provider come back as
    /// `api_tester`-tagged error messages.
    #[instrument(skip(self, turn), fields(model = %turn.model, history_len = turn.history.len()))]
    pub async fn explore(&self, turn: ExploratoryTurn) -> Result<Message, CoreError> {
        let condition = Condition::Exploratory;
        let thesis = Thesis {
            id: ThesisId::from("exploratory"),
            text: turn.thesis_text,
            pro: String::new(),
            contra: String::new(),
        };
        let messages = advance(condition, &thesis, &turn.history, turn.position, &turn.statement)?;
        let stage = if turn.history.is_empty() {
            Turn::First
        } else {
            Turn::Continuation
        };

        let adapter = ModelAdapter::new(self.factory.create(&turn.api_key, &turn.model))
            .with_component(condition.error_tag());
        let reply = adapter.invoke(messages, None).await;
        adapter.dispose();

        info!(error = reply.is_error(), "Exploratory turn served");
        Ok(finish(condition, &thesis, stage, reply))
    }
}
