use anyhow::Context;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Content type of the text exposition format served at /metrics
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Install the Prometheus recorder as the global metrics recorder
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
pub(crate) fn init_metric_descriptions() {
    describe_counter!(
        "analytics_requests_total",
        "Total number of Log and ListLogs calls"
    );
    describe_counter!(
        "analytics_errors_total",
        "Total number of failed calls by error type"
    );
    describe_histogram!(
        "analytics_request_duration_seconds",
        "Call duration in seconds"
    );
    describe_counter!(
        "analytics_entries_returned_total",
        "Total number of log entries returned by ListLogs"
    );
    describe_gauge!(
        "analytics_service_info",
        "Service version information"
    );

    gauge!("analytics_service_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a call
pub fn record_request(operation: &'static str) {
    counter!("analytics_requests_total", "operation" => operation).increment(1);
}

/// Record call duration
pub fn record_duration(operation: &'static str, duration: Duration) {
    histogram!("analytics_request_duration_seconds", "operation" => operation)
        .record(duration.as_secs_f64());
}

/// Record a failed call
pub fn record_error(operation: &'static str, error_type: &'static str) {
    counter!(
        "analytics_errors_total",
        "operation" => operation,
        "error_type" => error_type,
    )
    .increment(1);
}

/// Record the size of a ListLogs response
pub fn record_entries_returned(count: usize) {
    counter!("analytics_entries_returned_total").increment(count as u64);
}
