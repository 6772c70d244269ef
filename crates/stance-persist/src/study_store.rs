//! Study record storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::{StorageBackend, StorageError, StorageExt};
use stance_core::{Message, Position, ThesisId};

/// Client-side timestamps, epoch milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTimestamps {
    #[serde(default)]
    pub iframe_open: Option<i64>,
    #[serde(default)]
    pub chat_start: Option<i64>,
    #[serde(default)]
    pub chat_end: Option<i64>,
    #[serde(default)]
    pub completion: Option<i64>,
}

/// A completed participant run as submitted by the study frontend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyRecord {
    pub prolific_pid: String,
    /// Group letter the participant was assigned to
    pub group: String,
    pub thesis_id: ThesisId,
    pub thesis_title: String,
    pub thesis_text: String,
    pub run: i64,
    pub initial_position: Position,
    pub initial_information: i64,
    pub initial_statement: String,
    pub chat_history: Vec<Message>,
    pub final_position: Position,
    pub final_information: i64,
    #[serde(default)]
    pub timestamps: StudyTimestamps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_time_seconds: Option<f64>,
}

/// A record as kept in storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredStudyRecord {
    #[serde(flatten)]
    pub record: StudyRecord,
    pub created_at: DateTime<Utc>,
    pub document_id: Uuid,
}

/// Acknowledgement returned to the submitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub success: bool,
    pub message: String,
    pub document_id: String,
}

/// Append-only store of study records
#[derive(Debug)]
pub struct StudyStore<B: StorageBackend + ?Sized> {
    backend: Arc<B>,
    prefix: String,
    /// Disambiguates records saved within the same millisecond
    seq: AtomicU64,
}

impl<B: StorageBackend + ?Sized> StudyStore<B> {
    /// Create a new study store
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_prefix(backend, "study:")
    }

    /// Create with custom prefix
    pub fn with_prefix(backend: Arc<B>, prefix: &str) -> Self {
        Self {
            backend,
            prefix: prefix.to_string(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Keys sort in insertion order
    fn key(&self, created_at: DateTime<Utc>, id: Uuid) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}{:020}:{:010}:{}",
            self.prefix,
            created_at.timestamp_millis().max(0),
            seq,
            id
        )
    }

    /// Persist a record, stamping its creation time and document id
    pub async fn save(&self, record: StudyRecord) -> Result<SaveReceipt, StorageError> {
        let created_at = Utc::now();
        let document_id = Uuid::new_v4();
        let key = self.key(created_at, document_id);
        let stored = StoredStudyRecord {
            record,
            created_at,
            document_id,
        };

        if let Err(e) = self.backend.set(&key, &stored).await {
            warn!(error = %e, "Failed to save study data");
            return Err(e);
        }
        info!(
            document_id = %document_id,
            group = %stored.record.group,
            thesis = %stored.record.thesis_id,
            "Study data saved"
        );

        Ok(SaveReceipt {
            success: true,
            message: "Study data saved successfully".to_string(),
            document_id: document_id.to_string(),
        })
    }

    /// All records in insertion order
    pub async fn fetch_all(&self) -> Result<Vec<StoredStudyRecord>, StorageError> {
        let keys = self.backend.list_keys(&self.prefix).await?;
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            match self.backend.get::<StoredStudyRecord>(&key).await? {
                Some(record) => records.push(record),
                None => warn!(key = %key, "Study record vanished during fetch"),
            }
        }
        info!(count = records.len(), "Retrieved study records");
        Ok(records)
    }

    pub async fn count(&self) -> Result<u64, StorageError> {
        self.backend.count_keys(&self.prefix).await
    }
}
