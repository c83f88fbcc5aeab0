//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt against an instance:
//!     → upstream client retries the same instance on connection failures,
//!       waiting backoff.rs delays between tries
//!     → engine consults retries.rs with the final status and moves on to
//!       the next instance if it is retryable
//! ```
//!
//! # Design Decisions
//! - Two nested retry levels with independent bounds
//! - Backoff is exponential with jitter
//! - Cross-instance retries are immediate

pub mod backoff;
pub mod retries;

pub use retries::RetryPolicy;
