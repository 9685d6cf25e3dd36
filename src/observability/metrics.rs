//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define console metrics (request rate, latency, logins, rate limits)
//! - Track the wire runtime's in-flight request gauge
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `console_requests_total` (counter): requests by method, route, status
//! - `console_request_duration_seconds` (histogram): latency distribution
//! - `console_logins_total` (counter): login attempts by outcome
//! - `console_rate_limited_total` (counter): rejected requests by reason
//! - `wire_inflight_requests` (gauge): shell requests currently in flight
//!
//! # Design Decisions
//! - Route labels use the matched route pattern, never the raw path, to
//!   keep label cardinality bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`. Must be called from within
/// a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("console_requests_total", &labels).increment(1);
    histogram!("console_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record a login attempt.
pub fn record_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("console_logins_total", "outcome" => outcome).increment(1);
}

/// Record a rate-limited request.
pub fn record_rate_limited(reason: &'static str) {
    counter!("console_rate_limited_total", "reason" => reason).increment(1);
}

/// Track the shell's in-flight wire requests.
pub fn record_wire_in_flight(count: usize) {
    gauge!("wire_inflight_requests").set(count as f64);
}
