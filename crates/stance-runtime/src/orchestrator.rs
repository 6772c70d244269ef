//! Orchestrator - runs one study turn end to end
//!
//! start:    catalog → prompt builder → adapter → assembler (first turn)
//! continue: catalog → transformer → adapter → assembler (continuation)

use std::sync::Arc;

use stance_core::{
    advance, assemble, build_initial, Condition, CoreError, Message, SessionVariables,
    ThesisCatalog, Turn,
};
use stance_llm::{Metrics, ModelAdapter};
use tracing::{info, instrument};

/// Drives study conversations for the fixed catalog over one provider
#[derive(Debug, Clone)]
pub struct StudyOrchestrator {
    catalog: Arc<ThesisCatalog>,
    adapter: ModelAdapter,
    metrics: Option<Arc<Metrics>>,
}

impl StudyOrchestrator {
    pub fn new(catalog: Arc<ThesisCatalog>, adapter: ModelAdapter) -> Self {
        Self {
            catalog,
            adapter,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn catalog(&self) -> &ThesisCatalog {
        &self.catalog
    }

    /// Open a conversation.
    ///
    /// The thesis is resolved before the provider is touched. A provider
    /// failure is not an `Err`: it comes back as an error-role message.
    #[instrument(skip(self, vars), fields(condition = %condition, thesis = %vars.thesis_id))]
    pub async fn start(
        &self,
        condition: Condition,
        vars: &SessionVariables,
    ) -> Result<Message, CoreError> {
        let thesis = self.catalog.lookup(&vars.thesis_id)?;
        let prompt = build_initial(condition, thesis, vars.position, &vars.statement);
        let messages = vec![
            Message::system(prompt.system_instruction),
            Message::user(prompt.first_user_message),
        ];

        if let Some(metrics) = &self.metrics {
            metrics.record_session_started();
        }

        let reply = self
            .adapter
            .invoke(messages, vars.participant_id.as_deref())
            .await;
        info!(error = reply.is_error(), "Session started");
        Ok(finish(condition, thesis, Turn::First, reply))
    }

    /// Serve a follow-up turn on a participant-held transcript.
    #[instrument(
        skip(self, vars, history),
        fields(condition = %condition, thesis = %vars.thesis_id, history_len = history.len())
    )]
    pub async fn continue_session(
        &self,
        condition: Condition,
        vars: &SessionVariables,
        history: &[Message],
    ) -> Result<Message, CoreError> {
        if !condition.allows_continuation() {
            return Err(CoreError::ContinuationNotPermitted(condition));
        }
        let thesis = self.catalog.lookup(&vars.thesis_id)?;
        let messages = advance(condition, thesis, history, vars.position, &vars.statement)?;

        if let Some(metrics) = &self.metrics {
            metrics.record_continuation();
        }

        let reply = self
            .adapter
            .invoke(messages, vars.participant_id.as_deref())
            .await;
        info!(error = reply.is_error(), "Continuation served");
        Ok(finish(condition, thesis, Turn::Continuation, reply))
    }

    /// Release the provider
    pub fn dispose(self) {
        self.adapter.dispose();
    }
}

/// Assemble a successful completion; error messages pass through untouched
pub(crate) fn finish(
    condition: Condition,
    thesis: &stance_core::Thesis,
    turn: Turn,
    reply: Message,
) -> Message {
    if reply.is_error() {
        reply
    } else {
        assemble(condition, thesis, turn, &reply.content)
    }
}
