//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define the forwarding metrics
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `proxy_forward_requests_total` (counter): forwards by method, success
//! - `proxy_forward_latency_seconds` (histogram): forward latency, same labels
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; whichever recorder is
//!   installed (global exporter, or a local one in tests) receives it
//! - With no recorder installed, recording is a no-op
//! - Recording never fails the caller: panics are caught and logged

use std::any::Any;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const FORWARD_REQUESTS_TOTAL: &str = "proxy_forward_requests_total";
pub const FORWARD_LATENCY_SECONDS: &str = "proxy_forward_latency_seconds";

/// Install the Prometheus recorder with its own HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one forward: a counter increment and a latency observation.
pub fn record_forward(method: &'static str, success: bool, elapsed: Duration) {
    let success = if success { "true" } else { "false" };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        metrics::counter!(FORWARD_REQUESTS_TOTAL, "method" => method, "success" => success)
            .increment(1);
        metrics::histogram!(FORWARD_LATENCY_SECONDS, "method" => method, "success" => success)
            .record(elapsed.as_secs_f64());
    }));

    if let Err(panic) = outcome {
        tracing::error!(
            method,
            error = %panic_message(panic.as_ref()),
            "Failed to record forward metrics"
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
