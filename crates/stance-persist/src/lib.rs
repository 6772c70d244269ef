//! # Stance Persistence
//!
//! Storage for completed study records.
//!
//! Supports:
//! - In-memory (for testing)
//! - SQLite (default feature)

pub mod backend;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod study_store;

pub use backend::{MemoryBackend, StorageBackend, StorageError, StorageExt};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteBackend, SqliteConfig};
pub use study_store::{SaveReceipt, StoredStudyRecord, StudyRecord, StudyStore, StudyTimestamps};
