//! Demo downstream instance.
//!
//! Answers every request with `Hello World!`. Run a few on different ports
//! and point a service's hosts at them to watch the proxy rotate.

use axum::{
    http::{header, HeaderValue},
    response::IntoResponse,
    routing::any,
    Router,
};
use clap::Parser;
use tokio::net::TcpListener;

use vhost_proxy::lifecycle::Shutdown;
use vhost_proxy::observability::logging::{self, LogFormat};

#[derive(Parser)]
#[command(name = "testservice")]
#[command(about = "Hello World downstream for exercising the proxy", long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// Instance id shown in the logs
    #[arg(long, default_value = "0")]
    id: String,

    /// Adds `Cache-Control: public, max-age=N` to every response
    #[arg(long)]
    cache_control_max_age: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init_logging(LogFormat::Pretty)?;

    let cache_control = args
        .cache_control_max_age
        .map(|age| HeaderValue::from_str(&format!("public, max-age={}", age)))
        .transpose()?;

    let id = args.id.clone();
    let app = Router::new().fallback(any(move || {
        let cache_control = cache_control.clone();
        let id = id.clone();
        async move {
            tracing::info!(instance = %id, "Handling request");
            let mut response = "Hello World!\n".into_response();
            if let Some(value) = cache_control {
                response.headers_mut().insert(header::CACHE_CONTROL, value);
            }
            response
        }
    }));

    let listener = TcpListener::bind(("0.0.0.0", args.port)).await?;
    tracing::info!(instance = %args.id, address = %listener.local_addr()?, "testservice listening");

    let shutdown = Shutdown::new();
    let mut stop = shutdown.subscribe();
    shutdown.trigger_on_signal();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = stop.recv().await;
        })
        .await?;
    Ok(())
}
