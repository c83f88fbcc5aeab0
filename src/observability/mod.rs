//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (forward counter and latency histogram)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID rides on the request span, so every event carries it
//! - Metrics are cheap (atomic increments)
//! - The scrape endpoint is optional

pub mod logging;
pub mod metrics;
