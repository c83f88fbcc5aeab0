//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding handler under the route prefix
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener, stop on the shutdown signal
//! - Decode inbound requests and encode forwarding results

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::request::{into_proxy_request, request_id_header, MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::ApiError;
use crate::proxy::Forwarder;

/// Inbound listener settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Path prefix served by the proxy; `/` serves every path.
    pub route_prefix: String,

    /// Largest inbound body accepted.
    pub max_body_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            route_prefix: "/api".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<dyn Forwarder>,
    pub max_body_bytes: usize,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server in front of `forwarder`.
    pub fn new(forwarder: Arc<dyn Forwarder>, settings: &ServerSettings) -> Self {
        let state = AppState {
            forwarder,
            max_body_bytes: settings.max_body_bytes,
        };
        Self {
            router: Self::build_router(settings, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(settings: &ServerSettings, state: AppState) -> Router {
        let mut router: Router<AppState> = Router::new();
        for path in proxy_routes(&settings.route_prefix) {
            router = router.route(&path, any(forward_handler));
        }

        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(request_id_header())),
        )
    }

    /// The router, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Route paths covering `prefix` and everything below it.
fn proxy_routes(prefix: &str) -> Vec<String> {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return vec!["/".to_string(), "/{*path}".to_string()];
    }
    vec![
        format!("/{}", prefix),
        format!("/{}/", prefix),
        format!("/{}/{{*path}}", prefix),
    ]
}

/// Main proxy handler.
/// Normalizes the request, forwards it and writes back the result.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request = match into_proxy_request(request, state.max_body_bytes).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    tracing::debug!(method = %request.method, host = %request.host, "Forwarding request");

    match state.forwarder.forward(&request).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!(host = %request.host, status = %e.status(), error = %e, "Forward failed");
            ApiError::from(&e).into_response()
        }
    }
}
