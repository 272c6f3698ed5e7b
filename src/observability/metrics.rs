//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): inbound requests by method, status
//! - `gateway_request_duration_seconds` (histogram): inbound latency
//! - `gateway_upstream_requests_total` (counter): Printful calls by method, status
//! - `gateway_upstream_duration_seconds` (histogram): Printful latency
//! - `gateway_rate_limited_total` (counter): rejected requests by class
//!
//! # Design Decisions
//! - Without an installed recorder every call is a no-op
//! - Labels are low-cardinality: no paths or ids

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one inbound request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    let method = method.to_string();
    counter!("gateway_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    histogram!("gateway_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

/// Record one upstream call.
pub fn record_upstream(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    let method = method.to_string();
    counter!(
        "gateway_upstream_requests_total",
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!("gateway_upstream_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

/// Record a request rejected by the rate limiter.
pub fn record_rate_limited(class: &'static str) {
    counter!("gateway_rate_limited_total", "class" => class).increment(1);
}
