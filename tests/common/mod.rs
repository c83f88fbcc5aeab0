//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use vhost_proxy::config::parse_config;
use vhost_proxy::http::{HttpServer, ServerSettings};
use vhost_proxy::lifecycle::Shutdown;
use vhost_proxy::proxy::{ForwardingEngine, Instrumented};
use vhost_proxy::resilience::RetryPolicy;
use vhost_proxy::upstream::{HyperUpstream, UpstreamSettings};

/// Start a programmable mock backend. `f` gets the raw request head
/// (request line and headers) and returns the status and body to send.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        let (status, body) = f(head).await;
                        let reason = StatusCode::from_u16(status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("Unknown");

                        let response_str = format!(
                            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\n{}",
                            status,
                            reason,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        // Read the body too.
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                return text[..end].to_string();
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// YAML for a single service on the given instance ports.
#[allow(dead_code)]
pub fn single_service_yaml(domain: &str, ports: &[u16]) -> String {
    let hosts: String = ports
        .iter()
        .map(|p| format!("        - address: 127.0.0.1\n          port: {}\n", p))
        .collect();
    format!(
        "proxy:\n  listen:\n    address: 127.0.0.1\n    port: 8080\n  services:\n    - name: my-service\n      domain: {}\n      hosts:\n{}",
        domain, hosts
    )
}

/// Start the full proxy stack on `addr`. Returns the handle that stops it.
pub async fn start_proxy(addr: SocketAddr, yaml: &str, policy: RetryPolicy) -> Shutdown {
    let config = parse_config(yaml).unwrap().with_retry_policy(policy);
    let upstream = HyperUpstream::new(UpstreamSettings {
        request_timeout: Duration::from_secs(2),
        max_retries: 1,
        retry_wait_min: Duration::from_millis(10),
        retry_wait_max: Duration::from_millis(20),
        ..UpstreamSettings::default()
    });
    let forwarder = Instrumented::new(ForwardingEngine::new(Arc::new(config), upstream));
    let server = HttpServer::new(Arc::new(forwarder), &ServerSettings::default());

    let listener = TcpListener::bind(addr).await.unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    shutdown
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
