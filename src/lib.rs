//! Virtual-host reverse proxy library

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod proxy;
pub mod resilience;
pub mod upstream;

pub use config::Configuration;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::{ForwardingEngine, Forwarder, Instrumented};
