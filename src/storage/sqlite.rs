//! Row-oriented backend on SQLite
//!
//! This module provides:
//! - Connection pooling with WAL mode for concurrent reads/writes
//! - Automatic migrations
//! - Window predicates compiled to `created_at` comparisons

use super::{LogBackend, NewLogEntry, StorageError, StoredLogEntry};
use crate::clock::Clock;
use crate::codec::{decode_metadata, encode_metadata};
use crate::config::BackendKind;
use crate::window::TimeBound;
use anyhow::Context;
use async_trait::async_trait;
use chrono::DateTime;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// SQLite log store
pub struct SqliteBackend {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteBackend {
    /// Open (creating if missing) the database and run migrations
    ///
    /// # Arguments
    ///
    /// * `database_url` - SQLite URL (e.g., "sqlite:./data/analytics.db" or "sqlite::memory:")
    /// * `max_connections` - Pool size; forced to 1 for in-memory databases
    /// * `clock` - Source of `created_at` stamps
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid SQLite URL: {}", database_url))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(30)) // Wait up to 30s for locks
            .pragma("synchronous", "NORMAL");

        let mut pool_options = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(30));

        if in_memory {
            // Every connection to :memory: opens its own empty database
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options.journal_mode(SqliteJournalMode::Wal);
            pool_options = pool_options.max_connections(max_connections);

            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
            }
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to connect to analytics database")?;

        Self::run_migrations(&pool).await?;

        Ok(Self { pool, clock })
    }

    async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .context("Failed to run analytics database migrations")?;

        tracing::info!("Analytics database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl LogBackend for SqliteBackend {
    async fn insert(&self, entry: NewLogEntry) -> Result<(), StorageError> {
        let created_at = self.clock.now().timestamp_millis();
        let metadata = encode_metadata(&entry.metadata);

        sqlx::query(
            "INSERT INTO logs (service_name, level, message, metadata, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.service_name)
        .bind(&entry.level)
        .bind(&entry.message)
        .bind(&metadata)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query(&self, bound: TimeBound) -> Result<Vec<StoredLogEntry>, StorageError> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, service_name, level, message, metadata, created_at FROM logs WHERE 1=1",
        );

        if let Some(lower) = bound.lower {
            query.push(" AND created_at >= ").push_bind(lower.timestamp_millis());
        }
        if let Some(upper) = bound.upper {
            query.push(" AND created_at < ").push_bind(upper.timestamp_millis());
        }

        // id breaks ties between rows stamped in the same millisecond
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_entry).collect()
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<StoredLogEntry, StorageError> {
    let id: i64 = row.try_get("id")?;
    let malformed = |reason: String| StorageError::MalformedRecord {
        id: id.to_string(),
        reason,
    };

    let raw_metadata: String = row.try_get("metadata")?;
    let metadata = decode_metadata(&raw_metadata).map_err(|e| malformed(e.to_string()))?;

    let created_at_ms: i64 = row.try_get("created_at")?;
    let created_at = DateTime::from_timestamp_millis(created_at_ms)
        .ok_or_else(|| malformed(format!("created_at out of range: {}", created_at_ms)))?;

    let message: Option<String> = row.try_get("message")?;

    Ok(StoredLogEntry {
        service_name: row.try_get("service_name")?,
        level: row.try_get("level")?,
        message: message.unwrap_or_default(),
        metadata,
        created_at,
    })
}
