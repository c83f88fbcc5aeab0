//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Service resolved from Host header
//!     → next_host (instance under the service's cursor; the cursor moves
//!       past it in the same atomic step)
//!     → attempt is sent to that instance
//! ```
//!
//! # Design Decisions
//! - Selection state lives on the service, so balancers are stateless
//! - Every attempt claims its own slot, whatever its outcome
//! - Different services never contend with each other

pub mod round_robin;
pub mod service;

pub use round_robin::RoundRobin;
pub use service::{Host, Service};

/// Strategy for picking the instance of a service that receives an attempt.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Instance the next attempt goes to, advancing the service's rotation
    /// past it. `None` when the pool is empty.
    fn next_host<'a>(&self, service: &'a Service) -> Option<&'a Host>;
}
