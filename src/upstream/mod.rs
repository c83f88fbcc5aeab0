//! Outbound transport.
//!
//! # Data Flow
//! ```text
//! Engine picks an instance (address:port)
//!     → client.rs builds http://address:port/?query
//!     → hop-by-hop and Host headers dropped, the rest copied verbatim
//!     → hyper-util client call under the request deadline
//!         → connection failure: back off, same instance again
//!     → full response body read
//!     → UpstreamResponse or ForwardError (with its status)
//! ```
//!
//! # Design Decisions
//! - Any HTTP answer, 4xx/5xx included, is a successful transport outcome
//! - Failures surface as a synthetic 500 alongside the error
//! - Pooling and connection reuse belong to the hyper-util client

pub mod client;
pub mod error;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};

pub use client::{HyperUpstream, UpstreamSettings};
pub use error::ForwardError;

/// Response received from an instance, body fully buffered.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Empty 404, the answer for a host header no service claims.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, Bytes::new())
    }
}

/// Performs one HTTP call to one instance.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Send a request to `target` (`address:port`).
    async fn send(
        &self,
        method: &Method,
        target: &str,
        headers: &HeaderMap,
        query: Option<&str>,
        body: Bytes,
    ) -> Result<UpstreamResponse, ForwardError>;
}

/// Status an attempt ended with, whether it produced a response or an error.
pub fn outcome_status(outcome: &Result<UpstreamResponse, ForwardError>) -> StatusCode {
    match outcome {
        Ok(response) => response.status,
        Err(err) => err.status(),
    }
}
