//! Round-robin load balancing strategy.

use crate::load_balancer::{
    service::{Host, Service},
    LoadBalancer,
};

/// Round-robin selector.
/// Stateless itself; the rotation cursor lives on each [`Service`], so one
/// selector serves every service without cross-service locking.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoundRobin;

impl RoundRobin {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for RoundRobin {
    fn next_host<'a>(&self, service: &'a Service) -> Option<&'a Host> {
        service.claim_host()
    }
}
