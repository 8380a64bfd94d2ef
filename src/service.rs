//! Analytics service: the Log and ListLogs operations
//!
//! Stateless per call. Validation happens before any storage mutation, and a
//! storage failure is reported to the caller immediately, without retries.
//! The per-call timeout bounds reads only; inserts are never abandoned midway.

use crate::clock::Clock;
use crate::codec::{decode_metadata, encode_metadata};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{ListLogsRequest, ListLogsResponse, LogEntry, LogRequest, LogResponse};
use crate::storage::{LogBackend, NewLogEntry, StorageError};
use crate::window::resolve;
use chrono::{FixedOffset, Offset, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Confirmation returned by a successful Log call
pub const LOG_CONFIRMATION: &str = "Log entry added successfully";

#[derive(Clone)]
pub struct AnalyticsService {
    backend: Arc<dyn LogBackend>,
    clock: Arc<dyn Clock>,
    day_offset: FixedOffset,
    call_timeout: Option<Duration>,
}

impl AnalyticsService {
    /// Service with UTC day boundaries and no per-call timeout
    pub fn new(backend: Arc<dyn LogBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            day_offset: Utc.fix(),
            call_timeout: None,
        }
    }

    pub fn from_config(
        backend: Arc<dyn LogBackend>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> anyhow::Result<Self> {
        Ok(Self::new(backend, clock)
            .with_day_offset(config.time.day_offset()?)
            .with_call_timeout(config.storage.call_timeout()))
    }

    pub fn with_day_offset(mut self, day_offset: FixedOffset) -> Self {
        self.day_offset = day_offset;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Ingest one entry
    pub async fn log(&self, request: LogRequest) -> Result<LogResponse, AppError> {
        require_non_empty("service_name", &request.service_name)?;
        require_non_empty("level", &request.level)?;

        let metadata = decode_metadata(&request.metadata).map_err(|e| {
            warn!(service_name = %request.service_name, error = %e, "Rejected log entry");
            AppError::from(e)
        })?;

        let entry = NewLogEntry {
            service_name: request.service_name,
            level: request.level,
            message: request.message,
            metadata,
        };
        let (service_name, level) = (entry.service_name.clone(), entry.level.clone());

        // An issued insert runs to completion: no timeout, and a dropped
        // caller does not cancel it
        let backend = self.backend.clone();
        let inserted = tokio::spawn(async move { backend.insert(entry).await })
            .await
            .map_err(StorageError::from)
            .and_then(|result| result);

        inserted.map_err(|e| {
            error!(service_name = %service_name, error = %e, "Failed to store log entry");
            AppError::from(e)
        })?;

        debug!(service_name = %service_name, level = %level, "Log entry stored");

        Ok(LogResponse {
            message: LOG_CONFIRMATION.to_string(),
        })
    }

    /// Entries within the requested window, newest first
    pub async fn list_logs(&self, request: ListLogsRequest) -> Result<ListLogsResponse, AppError> {
        let bound = resolve(request.window, self.clock.now(), self.day_offset);

        let stored = self.bounded(self.backend.query(bound)).await.map_err(|e| {
            error!(window = %request.window, error = %e, "Failed to list log entries");
            AppError::from(e)
        })?;

        let logs: Vec<LogEntry> = stored
            .into_iter()
            .map(|entry| LogEntry {
                metadata: encode_metadata(&entry.metadata),
                service_name: entry.service_name,
                level: entry.level,
                message: entry.message,
                created_at: entry.created_at,
            })
            .collect();

        debug!(window = %request.window, count = logs.len(), "Listed log entries");

        Ok(ListLogsResponse { logs })
    }

    /// Backend reachability
    pub async fn ping(&self) -> Result<(), AppError> {
        self.bounded(self.backend.ping())
            .await
            .map_err(|e| AppError::Unavailable(e.to_string()))
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<T, StorageError> {
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| StorageError::TimedOut(limit))?,
            None => call.await,
        }
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidArgument(format!("{} is required", field)));
    }
    Ok(())
}
