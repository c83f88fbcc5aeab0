//! Instrumentation decorator for forwarders.

use std::time::Instant;

use async_trait::async_trait;

use crate::observability::metrics;
use crate::proxy::{Forwarder, ProxyRequest};
use crate::upstream::{ForwardError, UpstreamResponse};

/// Label value identifying the wrapped operation.
pub const FORWARD_METHOD: &str = "Forward";

/// Wraps a forwarder and records a request count and latency per call.
///
/// The delegate's result is returned untouched; a routing miss counts as a
/// success because it is not an error.
#[derive(Debug)]
pub struct Instrumented<F> {
    inner: F,
}

impl<F: Forwarder> Instrumented<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<F: Forwarder> Forwarder for Instrumented<F> {
    async fn forward(&self, request: &ProxyRequest) -> Result<UpstreamResponse, ForwardError> {
        let started = Instant::now();
        let result = self.inner.forward(request).await;
        metrics::record_forward(FORWARD_METHOD, result.is_ok(), started.elapsed());
        result
    }
}
