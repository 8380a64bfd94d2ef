//! Storage backends for log entries
//!
//! One contract, two storage paradigms:
//! - **Row-oriented** ([`SqliteBackend`]): metadata kept as serialized JSON text
//! - **Document-oriented** ([`DocumentBackend`]): metadata kept as a nested document
//!
//! Both stamp `created_at` from the injected [`Clock`] on insert and return
//! entries newest first. Entries are never updated or deleted.

pub mod document;
pub mod sqlite;

use crate::clock::Clock;
use crate::codec::Document;
use crate::config::{BackendKind, StorageConfig};
use crate::window::TimeBound;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

pub use document::DocumentBackend;
pub use sqlite::SqliteBackend;

/// Entry handed to a backend for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub service_name: String,
    pub level: String,
    pub message: Option<String>,
    pub metadata: Document,
}

/// Entry read back from a backend
#[derive(Debug, Clone, PartialEq)]
pub struct StoredLogEntry {
    pub service_name: String,
    pub level: String,
    /// Absent messages read back as ""
    pub message: String,
    pub metadata: Document,
    pub created_at: DateTime<Utc>,
}

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document store error: {0}")]
    Document(#[from] sled::Error),

    #[error("malformed stored record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage call timed out after {0:?}")]
    TimedOut(std::time::Duration),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Persistence contract shared by every backend
#[async_trait]
pub trait LogBackend: Send + Sync {
    /// Durably append one entry, stamping `created_at` at insert time
    async fn insert(&self, entry: NewLogEntry) -> Result<(), StorageError>;

    /// All entries whose `created_at` falls within `bound`, newest first
    ///
    /// Entries sharing a timestamp come back in a stable order within one call.
    /// A stored record that cannot be decoded fails the whole call.
    async fn query(&self, bound: TimeBound) -> Result<Vec<StoredLogEntry>, StorageError>;

    /// Reachability check
    async fn ping(&self) -> Result<(), StorageError>;

    fn kind(&self) -> BackendKind;
}

/// Open the backend selected by configuration
pub async fn connect(config: &StorageConfig, clock: Arc<dyn Clock>) -> Result<Arc<dyn LogBackend>> {
    let backend: Arc<dyn LogBackend> = match config.backend {
        BackendKind::Sqlite => Arc::new(
            SqliteBackend::new(&config.sqlite.url, config.sqlite.max_connections, clock).await?,
        ),
        BackendKind::Document => Arc::new(DocumentBackend::open(&config.document.path, clock)?),
    };

    tracing::info!(backend = %backend.kind(), "Storage backend opened");
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::config::{DocumentConfig, SqliteConfig};

    fn storage_config(backend: BackendKind, dir: &tempfile::TempDir) -> StorageConfig {
        StorageConfig {
            backend,
            call_timeout_seconds: 10,
            sqlite: SqliteConfig {
                url: format!("sqlite:{}", dir.path().join("logs.db").display()),
                max_connections: 2,
            },
            document: DocumentConfig {
                path: dir.path().join("docs").display().to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_connect_selects_backend_from_config() {
        let dir = tempfile::tempdir().unwrap();

        let sqlite = connect(&storage_config(BackendKind::Sqlite, &dir), Arc::new(SystemClock))
            .await
            .unwrap();
        assert_eq!(sqlite.kind(), BackendKind::Sqlite);
        sqlite.ping().await.unwrap();

        let document = connect(&storage_config(BackendKind::Document, &dir), Arc::new(SystemClock))
            .await
            .unwrap();
        assert_eq!(document.kind(), BackendKind::Document);
        document.ping().await.unwrap();
    }

    #[test]
    fn test_malformed_record_display() {
        let err = StorageError::MalformedRecord {
            id: "7".to_string(),
            reason: "metadata is not valid JSON".to_string(),
        };
        assert_eq!(err.to_string(), "malformed stored record 7: metadata is not valid JSON");
    }
}
