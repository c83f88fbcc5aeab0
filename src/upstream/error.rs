//! Forwarding errors.

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// Failure of a forwarding attempt.
///
/// Every variant carries the HTTP status that goes with it, so the retry
/// policy and the HTTP layer can treat errors and responses alike.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("service '{service}' has no instances")]
    NoInstances { service: String },

    #[error("invalid upstream target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("failed to request service url {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("request to service url {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("failed to read response from service url {url}: {source}")]
    ResponseBody {
        url: String,
        status: StatusCode,
        #[source]
        source: axum::Error,
    },
}

impl ForwardError {
    /// Status reported alongside the error.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::NoInstances { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ForwardError::InvalidTarget { .. }
            | ForwardError::Transport { .. }
            | ForwardError::Timeout { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ForwardError::ResponseBody { status, .. } => *status,
        }
    }
}
