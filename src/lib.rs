pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod server;
pub mod service;
pub mod signals;
pub mod storage;
pub mod window;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence over `log_level`. `log_format` selects
/// human-readable ("text") or JSON output.
///
/// Note: This function can only be called once per process.
pub fn init_tracing(log_level: &str, log_format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);

    match log_format {
        "json" => registry.with(fmt::layer().json().with_target(true)).init(),
        _ => registry.with(fmt::layer().with_target(true)).init(),
    }
}
