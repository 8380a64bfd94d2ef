//! Command implementations for the CLI
//!
//! - serve: Start the HTTP server
//! - logs: List stored entries in a time window
//! - ingest: Store one entry
//! - config: Configuration display and validation

pub mod config;
pub mod ingest;
pub mod logs;
pub mod serve;

use analytics_service::{
    clock::{Clock, SystemClock},
    config::Config,
    service::AnalyticsService,
    storage,
};
use anyhow::Result;
use std::sync::Arc;

/// Open the configured backend and wrap it in a service, outside the server
pub(crate) async fn open_service(cfg: &Config) -> Result<AnalyticsService> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let backend = storage::connect(&cfg.storage, clock.clone()).await?;
    AnalyticsService::from_config(backend, clock, cfg)
}
