//! hyper-util based upstream client.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, Method, Request, Response, Uri};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::resilience::backoff::calculate_backoff;
use crate::upstream::{ForwardError, UpstreamClient, UpstreamResponse};

/// Headers meaningful for a single connection only.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Transport tuning. Independent of the cross-instance retry policy.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    /// Deadline for a whole call, same-instance retries included.
    pub request_timeout: Duration,

    /// Retries of the same instance after a connection failure.
    pub max_retries: u32,

    /// First backoff wait; doubles per retry.
    pub retry_wait_min: Duration,

    /// Backoff ceiling.
    pub retry_wait_max: Duration,

    /// Largest response body buffered.
    pub max_response_bytes: usize,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(2),
            max_retries: 3,
            retry_wait_min: Duration::from_millis(50),
            retry_wait_max: Duration::from_secs(1),
            max_response_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Upstream client over a pooled hyper-util HTTP/1 client.
#[derive(Debug, Clone)]
pub struct HyperUpstream {
    client: Client<HttpConnector, Body>,
    settings: UpstreamSettings,
}

impl HyperUpstream {
    pub fn new(settings: UpstreamSettings) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, settings }
    }

    async fn send_with_retries(
        &self,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse, ForwardError> {
        let mut retries = 0;
        loop {
            let request = build_request(method, uri, headers, body.clone())?;

            match self.client.request(request).await {
                Ok(response) => return self.read_response(uri, response).await,
                Err(e) if e.is_connect() && retries < self.settings.max_retries => {
                    retries += 1;
                    let delay = calculate_backoff(
                        retries,
                        self.settings.retry_wait_min,
                        self.settings.retry_wait_max,
                    );
                    tracing::debug!(url = %uri, retry = retries, delay = ?delay, error = %e, "Connection failed, retrying instance");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::warn!(url = %uri, retries, error = %e, "Upstream request failed");
                    return Err(ForwardError::Transport {
                        url: uri.to_string(),
                        source: e,
                    });
                }
            }
        }
    }

    async fn read_response(
        &self,
        uri: &Uri,
        response: Response<Incoming>,
    ) -> Result<UpstreamResponse, ForwardError> {
        let (mut parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), self.settings.max_response_bytes)
            .await
            .map_err(|source| {
                tracing::warn!(url = %uri, status = %parts.status, error = %source, "Failed to read upstream body");
                ForwardError::ResponseBody {
                    url: uri.to_string(),
                    status: parts.status,
                    source,
                }
            })?;

        strip_hop_by_hop(&mut parts.headers);
        tracing::debug!(url = %uri, status = %parts.status, bytes = body.len(), "Upstream responded");

        Ok(UpstreamResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

impl Default for HyperUpstream {
    fn default() -> Self {
        Self::new(UpstreamSettings::default())
    }
}

#[async_trait]
impl UpstreamClient for HyperUpstream {
    async fn send(
        &self,
        method: &Method,
        target: &str,
        headers: &HeaderMap,
        query: Option<&str>,
        body: Bytes,
    ) -> Result<UpstreamResponse, ForwardError> {
        let url = build_url(target, query)?;
        let uri: Uri = url.as_str().parse().map_err(|e: axum::http::uri::InvalidUri| {
            ForwardError::InvalidTarget {
                target: target.to_string(),
                reason: e.to_string(),
            }
        })?;

        let timeout = self.settings.request_timeout;
        match tokio::time::timeout(timeout, self.send_with_retries(method, &uri, headers, body)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(url = %uri, timeout = ?timeout, "Upstream request timed out");
                Err(ForwardError::Timeout {
                    url: uri.to_string(),
                    timeout,
                })
            }
        }
    }
}

/// `http://<target>/[?<query>]`. Instances are configured by address, so
/// the scheme is always plain HTTP.
pub fn build_url(target: &str, query: Option<&str>) -> Result<Url, ForwardError> {
    let mut url = Url::parse(&format!("http://{}", target)).map_err(|e| {
        ForwardError::InvalidTarget {
            target: target.to_string(),
            reason: e.to_string(),
        }
    })?;
    url.set_query(query.filter(|q| !q.is_empty()));
    Ok(url)
}

fn build_request(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Request<Body>, ForwardError> {
    let mut request = Request::builder()
        .method(method.clone())
        .uri(uri.clone())
        .body(Body::from(body))
        .map_err(|e| ForwardError::InvalidTarget {
            target: uri.to_string(),
            reason: e.to_string(),
        })?;

    let mut forwarded = headers.clone();
    strip_hop_by_hop(&mut forwarded);
    // The client derives Host from the target URI.
    forwarded.remove(header::HOST);
    *request.headers_mut() = forwarded;

    Ok(request)
}

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in &named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}
