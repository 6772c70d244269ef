//! LLM Provider trait and common types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stance_core::Message;
use thiserror::Error;

/// Errors from LLM providers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Rate limited")]
    RateLimited,
}

/// Provider-side request metadata, never part of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    /// Participant correlation token (the panel's participant id)
    #[serde(rename = "prolific_id")]
    pub participant_id: String,
}

/// A chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Ordered conversation, system instruction first
    pub messages: Vec<Message>,
    pub metadata: Option<RequestMetadata>,
}

impl LlmRequest {
    /// Request with no participant attached
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            metadata: None,
        }
    }

    /// Attach a participant correlation token
    pub fn with_participant(mut self, participant_id: Option<&str>) -> Self {
        self.metadata = participant_id.map(|id| RequestMetadata {
            participant_id: id.to_string(),
        });
        self
    }
}

/// Response from an LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated text
    pub content: String,
    /// Model used
    pub model: String,
    /// Tokens used (if available)
    pub tokens_used: Option<u32>,
    /// Time taken in milliseconds
    pub latency_ms: u64,
}

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync + std::fmt::Debug {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Generate a completion for the full conversation
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}
