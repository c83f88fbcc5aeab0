//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn an upstream response into the client response
//! - Encode forwarding errors as `{"error": "<message>"}`
//!
//! # Design Decisions
//! - Upstream body passed through untouched
//! - Hop-by-hop headers already stripped by the upstream client
//! - Error status comes from the error itself

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::upstream::{ForwardError, UpstreamResponse};

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error response with a status and a message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl From<&ForwardError> for ApiError {
    fn from(err: &ForwardError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        response.headers_mut().extend(self.headers);
        response
    }
}
