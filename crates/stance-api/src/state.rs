//! Application State
//!
//! Centralizes access to the study runtime, record store and metrics.

use std::sync::Arc;

use stance_llm::Metrics;
use stance_persist::{StorageBackend, StudyStore};
use stance_runtime::{Explorer, StudyOrchestrator};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<StudyOrchestrator>,
    explorer: Arc<Explorer>,
    store: Arc<StudyStore<dyn StorageBackend>>,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        orchestrator: Arc<StudyOrchestrator>,
        explorer: Arc<Explorer>,
        store: Arc<StudyStore<dyn StorageBackend>>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            orchestrator,
            explorer,
            store,
            metrics,
        }
    }

    pub fn orchestrator(&self) -> &StudyOrchestrator {
        &self.orchestrator
    }

    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    pub fn store(&self) -> &StudyStore<dyn StorageBackend> {
        &self.store
    }

    /// Get metrics collector (cloned Arc for sharing)
    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Take the orchestrator back out for disposal, if this is the last handle
    pub fn into_orchestrator(self) -> Option<StudyOrchestrator> {
        Arc::into_inner(self.orchestrator)
    }
}
