use crate::codec::CodecError;
use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Malformed caller input, reported as a client fault
    InvalidArgument(String),
    /// Storage or re-encode failure, reported as a server fault
    Internal(String),
    /// Backend not reachable (readiness)
    Unavailable(String),
}

impl AppError {
    /// Status code name in the style of RPC status codes
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Internal(_) => "INTERNAL",
            Self::Unavailable(_) => "UNAVAILABLE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(msg) | Self::Internal(msg) | Self::Unavailable(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
            Self::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message(),
                "type": error_type_name(&self),
                "code": self.code(),
            }
        }));

        (self.status(), body).into_response()
    }
}

pub fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::InvalidArgument(_) => "invalid_argument",
        AppError::Internal(_) => "internal_error",
        AppError::Unavailable(_) => "unavailable",
    }
}

// Storage failures are always server faults, carrying the backend message
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self::Internal(err.to_string())
    }
}

// Codec failures reach callers only through Log input validation
impl From<CodecError> for AppError {
    fn from(err: CodecError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
