//! Request forwarding.
//!
//! # Data Flow
//! ```text
//! ProxyRequest (from the HTTP layer)
//!     → instrumented.rs (timing starts)
//!     → engine.rs
//!         → service looked up by Host header (miss → 404)
//!         → load balancer claims the instance under the cursor (cursor advances)
//!         → upstream client sends the attempt
//!         → retry policy decides: next instance or done
//!     → instrumented.rs (counter + latency recorded)
//!     → back to the HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bare and instrumented forwarders share one trait and compose by
//!   wrapping, so callers cannot tell them apart
//! - Errors are values; nothing on the forwarding path panics

pub mod engine;
pub mod instrumented;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method};

use crate::upstream::{ForwardError, UpstreamResponse};

pub use engine::ForwardingEngine;
pub use instrumented::Instrumented;

/// Normalized inbound request.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub headers: HeaderMap,
    /// Virtual host the request is addressed to.
    pub host: String,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    pub body: Bytes,
}

impl ProxyRequest {
    pub fn new(method: Method, host: impl Into<String>) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            host: host.into(),
            query: None,
            body: Bytes::new(),
        }
    }
}

/// Forwards a request to an instance of the service it is addressed to.
///
/// An unknown host is `Ok` with an empty 404. Any other outcome is the
/// last attempt's response or error.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(&self, request: &ProxyRequest) -> Result<UpstreamResponse, ForwardError>;
}
