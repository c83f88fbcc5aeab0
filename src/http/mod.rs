//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing span)
//!     → request.rs (Host header, query, buffered body → ProxyRequest)
//!     → [forwarder picks the service and instance]
//!     → response.rs (upstream response or JSON error)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{HttpServer, ServerSettings};
