use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    clock::{Clock, SystemClock},
    config::Config,
    handlers, metrics,
    service::AnalyticsService,
    signals::setup_signal_handlers,
    storage,
};

/// Request bodies above this size are rejected
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Start the analytics server
///
/// This function:
/// 1. Initializes metrics
/// 2. Opens the configured storage backend and pings it once (fatal on failure)
/// 3. Sets up signal handlers for graceful shutdown
/// 4. Binds to the configured address
/// 5. Serves requests until SIGTERM/SIGINT
pub async fn start_server(config: Config) -> Result<()> {
    info!("Initializing Prometheus metrics...");
    let metrics_handle = Arc::new(metrics::init_metrics()?);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let backend = storage::connect(&config.storage, clock.clone()).await?;

    backend
        .ping()
        .await
        .with_context(|| format!("Storage backend '{}' is not reachable", backend.kind()))?;
    info!(backend = %backend.kind(), "Storage backend is reachable");

    let service = AnalyticsService::from_config(backend, clock, &config)?;

    // Setup signal handlers (SIGTERM, SIGINT for shutdown)
    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app = create_router(service, metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting analytics service on {}", addr);
    info!(
        "Configuration: backend={}, call timeout={:?}, UTC offset={} min",
        config.storage.backend,
        config.storage.call_timeout(),
        config.time.utc_offset_minutes
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(service: AnalyticsService, metrics_handle: Arc<PrometheusHandle>) -> Router {
    let api_routes = Router::new()
        .route(
            "/v1/logs",
            post(handlers::logs::log).get(handlers::logs::list_logs),
        )
        .route("/ready", get(handlers::health::readiness_check))
        .with_state(service);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics_handler::metrics))
        .with_state(metrics_handle)
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}
