//! Virtual-host reverse proxy
//!
//! Routes each request by its `Host` header to a configured service and
//! forwards it to one of the service's instances in round-robin order,
//! moving on to the next instance when the answer has a retryable status.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ proxy::Instrumented ──▶ proxy::ForwardingEngine
//!                      (request id,      (counter +               │  config: Host → Service
//!                       trace span)       latency)                │  load_balancer: RoundRobin
//!                                                                 ▼
//!     Client Response                                      upstream::HyperUpstream ──▶ Instance
//!     ◀────────────── http::response ◀─────────────────────  (deadline, connect retry)
//! ```

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use vhost_proxy::cli::Cli;
use vhost_proxy::config::load_config;
use vhost_proxy::http::HttpServer;
use vhost_proxy::lifecycle::Shutdown;
use vhost_proxy::observability::{logging, metrics};
use vhost_proxy::proxy::{ForwardingEngine, Instrumented};
use vhost_proxy::upstream::HyperUpstream;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_format)?;

    tracing::info!("vhost-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config_path();
    let config = load_config(&config_path)?.with_retry_policy(cli.retry_policy());

    tracing::info!(
        path = %config_path.display(),
        listen = %config.listen,
        services = config.services().count(),
        max_forward_retries = config.retry_policy.max_forward_retries,
        "Configuration loaded"
    );

    if let Some(addr) = cli.metrics_address {
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(config.listen.target()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let engine = ForwardingEngine::new(Arc::new(config), HyperUpstream::new(cli.upstream_settings()));
    let server = HttpServer::new(Arc::new(Instrumented::new(engine)), &cli.server_settings());

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
