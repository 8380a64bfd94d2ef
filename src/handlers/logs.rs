//! Log and ListLogs HTTP handlers
//!
//! - `POST /v1/logs` ingests one entry
//! - `GET /v1/logs?window=TODAY` lists entries in a time window, newest first

use crate::error::{error_type_name, AppError};
use crate::metrics;
use crate::models::{ListLogsRequest, ListLogsResponse, LogRequest, LogResponse};
use crate::service::AnalyticsService;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use std::time::Instant;

/// POST /v1/logs
///
/// Example body:
/// ```json
/// {"service_name": "billing", "level": "ERROR", "message": "charge failed", "metadata": "{\"order_id\":42}"}
/// ```
pub async fn log(
    State(service): State<AnalyticsService>,
    payload: Result<Json<LogRequest>, JsonRejection>,
) -> Result<Json<LogResponse>, AppError> {
    let start = Instant::now();
    metrics::record_request("log");

    let result = match payload {
        Ok(Json(request)) => service.log(request).await,
        Err(rejection) => Err(AppError::InvalidArgument(rejection.body_text())),
    };

    metrics::record_duration("log", start.elapsed());
    if let Err(e) = &result {
        metrics::record_error("log", error_type_name(e));
    }

    result.map(Json)
}

/// GET /v1/logs
///
/// Example: GET /v1/logs?window=LAST_WEEK (also `last_week`, `last-week`)
pub async fn list_logs(
    State(service): State<AnalyticsService>,
    query: Result<Query<ListLogsRequest>, QueryRejection>,
) -> Result<Json<ListLogsResponse>, AppError> {
    let start = Instant::now();
    metrics::record_request("list_logs");

    let result = match query {
        Ok(Query(request)) => service.list_logs(request).await,
        Err(rejection) => Err(AppError::InvalidArgument(rejection.body_text())),
    };

    metrics::record_duration("list_logs", start.elapsed());
    match &result {
        Ok(response) => metrics::record_entries_returned(response.logs.len()),
        Err(e) => metrics::record_error("list_logs", error_type_name(e)),
    }

    result.map(Json)
}
