//! # Stance Runtime
//!
//! Session orchestration: wires the catalog, prompt rules and model adapter
//! into the start / continue / explore operations the HTTP layer exposes.

pub mod explorer;
pub mod orchestrator;

pub use explorer::{ExploratoryTurn, Explorer, OpenAIFactory, ProviderFactory};
pub use orchestrator::StudyOrchestrator;
