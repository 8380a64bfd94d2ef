use crate::service::AnalyticsService;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

/// Health check endpoint
/// Returns 200 OK if the process is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": "analytics-service",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Readiness check endpoint
/// Returns 200 OK only while the storage backend answers a ping
pub async fn readiness_check(State(service): State<AnalyticsService>) -> impl IntoResponse {
    match service.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({
            "status": "ready",
            "service": "analytics-service",
        }))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({
                "status": "unavailable",
                "service": "analytics-service",
                "error": e.to_string(),
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::storage::{LogBackend, SqliteBackend};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_check_pings_backend() {
        let clock = Arc::new(SystemClock);
        let backend: Arc<dyn LogBackend> = Arc::new(
            SqliteBackend::new("sqlite::memory:", 1, clock.clone()).await.unwrap(),
        );
        let service = AnalyticsService::new(backend, clock);

        let response = readiness_check(State(service)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
