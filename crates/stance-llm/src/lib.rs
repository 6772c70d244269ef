//! # Stance LLM
//!
//! Language-model access for the study service.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`LlmProvider`] | trait over a chat-completion backend |
//! | [`OpenAIProvider`] | OpenAI-compatible HTTP backend |
//! | [`MockProvider`] | canned responses for tests |
//! | [`ModelAdapter`] | turns provider results into transcript messages |
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use stance_core::Message;
//! use stance_llm::{MockProvider, ModelAdapter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let adapter = ModelAdapter::new(Arc::new(MockProvider::constant("Hallo!")));
//!     let reply = adapter.invoke(vec![Message::user("Hi")], None).await;
//!     assert_eq!(reply.content, "Hallo!");
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod metrics;
pub mod mock;
pub mod openai;
pub mod provider;

pub use adapter::{ModelAdapter, STUDY_COMPONENT, TESTER_COMPONENT};
pub use config::{ConfigError, LlmConfig};
pub use metrics::{Metrics, MetricsSnapshot};
pub use mock::MockProvider;
pub use openai::OpenAIProvider;
pub use provider::{LlmError, LlmProvider, LlmRequest, LlmResponse, RequestMetadata};
