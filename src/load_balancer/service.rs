//! Services and their instance pools.
//!
//! # Responsibilities
//! - Represent a single downstream instance (`Host`)
//! - Represent a logical service: its domain, its ordered pool and the
//!   rotation cursor the load balancer moves
//!
//! The cursor is the only mutable state shared between requests. It is an
//! atomic so concurrent advances never collapse into one.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A single downstream instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host {
    pub address: String,
    pub port: u16,
}

impl Host {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// Connection target, `address:port`.
    pub fn target(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// A logical downstream identified by its virtual-host domain.
#[derive(Debug)]
pub struct Service {
    name: String,
    domain: String,
    hosts: Vec<Host>,
    /// Index of the host the next attempt goes to. Always `< hosts.len()`,
    /// or 0 for an empty pool.
    cursor: AtomicUsize,
}

impl Service {
    /// Create a service whose rotation starts at the first host.
    pub fn new(name: impl Into<String>, domain: impl Into<String>, hosts: Vec<Host>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            hosts,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Hosts in rotation order.
    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// Current rotation cursor.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Host under the cursor, moving the cursor past it in the same atomic
    /// step. `None` for an empty pool.
    ///
    /// Concurrent callers each get their own slot: N calls visit N
    /// consecutive hosts and move the cursor by exactly N.
    pub fn claim_host(&self) -> Option<&Host> {
        let len = self.hosts.len();
        if len == 0 {
            return None;
        }
        // The closure never returns None, so both arms hold the previous value.
        let previous = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
            .unwrap_or_else(|c| c);
        self.hosts.get(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_joins_address_and_port() {
        let host = Host::new("127.0.0.1", 5000);
        assert_eq!(host.target(), "127.0.0.1:5000");
        assert_eq!(host.to_string(), "127.0.0.1:5000");
    }

    #[test]
    fn claim_takes_slot_and_wraps() {
        let service = Service::new(
            "svc",
            "svc.com",
            vec![Host::new("10.0.0.1", 1), Host::new("10.0.0.2", 2)],
        );
        assert_eq!(service.cursor(), 0);
        assert_eq!(service.claim_host(), Some(&Host::new("10.0.0.1", 1)));
        assert_eq!(service.cursor(), 1);
        assert_eq!(service.claim_host(), Some(&Host::new("10.0.0.2", 2)));
        assert_eq!(service.cursor(), 0);
    }

    #[test]
    fn empty_pool_stays_at_zero() {
        let service = Service::new("svc", "svc.com", vec![]);
        assert!(service.claim_host().is_none());
        assert_eq!(service.cursor(), 0);
    }
}
