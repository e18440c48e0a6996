//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Count dispatch outcomes per verb
//! - Time operation execution per route
//! - Expose a Prometheus-compatible endpoint when enabled
//!
//! # Metrics
//! - `rest_dispatch_total` (counter): dispatch attempts by method, outcome
//! - `rest_operation_duration_seconds` (histogram): operation latency by route, status
//! - `rest_operations_total` (counter): completed operations by route, status
//!
//! # Design Decisions
//! - Values go to the installed recorder; nothing is aggregated in-process
//! - Without an installed recorder every call is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// One dispatch attempt and how it ended (`submitted`, `not_found`, `denied`, `invalid`).
pub fn record_dispatch(method: &str, outcome: &'static str) {
    ::metrics::counter!(
        "rest_dispatch_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// One finished operation.
pub fn record_execution(route: &str, status: u16, started: Instant) {
    let status = status.to_string();
    ::metrics::counter!(
        "rest_operations_total",
        "route" => route.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    ::metrics::histogram!(
        "rest_operation_duration_seconds",
        "route" => route.to_string(),
        "status" => status
    )
    .record(started.elapsed().as_secs_f64());
}
