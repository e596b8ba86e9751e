//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, backend
//! - `proxy_request_duration_seconds` (histogram): upstream latency
//! - `proxy_upstream_errors_total` (counter): failed round-trips by backend
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, backend: &str, start_time: Instant) {
    ::metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);
    ::metrics::histogram!("proxy_request_duration_seconds", "backend" => backend.to_string())
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_upstream_error(backend: &str) {
    ::metrics::counter!("proxy_upstream_errors_total", "backend" => backend.to_string())
        .increment(1);
}
