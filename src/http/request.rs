//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) unless the client sent one
//! - Extract routing-relevant information (Host header)
//! - Buffer the body and build the normalized `ProxyRequest`
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Body size bounded while reading
//! - Host header taken verbatim: no lowercasing, no port stripping

use axum::body::Body;
use axum::http::{header, HeaderName, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::proxy::ProxyRequest;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

pub fn request_id_header() -> HeaderName {
    HeaderName::from_static(X_REQUEST_ID)
}

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

/// Read the body (up to `limit` bytes) and normalize the request.
pub async fn into_proxy_request(
    request: Request<Body>,
    limit: usize,
) -> Result<ProxyRequest, axum::Error> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, limit).await?;

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_default();

    Ok(ProxyRequest {
        method: parts.method,
        headers: parts.headers,
        host,
        query: parts.uri.query().map(str::to_string),
        body,
    })
}
