//! Request and response types for the Log and ListLogs operations

use crate::window::TimeWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Log operation input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRequest {
    pub service_name: String,
    pub level: String,
    #[serde(default)]
    pub message: Option<String>,
    /// JSON object encoded as a string
    pub metadata: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogResponse {
    pub message: String,
}

/// ListLogs operation input
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListLogsRequest {
    #[serde(default)]
    pub window: TimeWindow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListLogsResponse {
    pub logs: Vec<LogEntry>,
}

/// A stored log entry as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub service_name: String,
    pub level: String,
    pub message: String,
    /// JSON object encoded as a string
    pub metadata: String,
    /// RFC 3339, UTC
    pub created_at: DateTime<Utc>,
}
