//! Runtime configuration.
//!
//! Built once at startup and handed to the engine behind an `Arc`. Only the
//! per-service rotation cursors change afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use crate::load_balancer::{Host, Service};
use crate::resilience::RetryPolicy;

/// Validated proxy configuration.
#[derive(Debug)]
pub struct Configuration {
    /// Address the proxy listens on.
    pub listen: Host,

    services: HashMap<String, Arc<Service>>,

    /// Cross-instance retry policy.
    pub retry_policy: RetryPolicy,
}

impl Configuration {
    /// Build a configuration from services, keyed by their domain.
    /// A later service with the same domain replaces an earlier one.
    pub fn new(listen: Host, services: impl IntoIterator<Item = Service>) -> Self {
        let services = services
            .into_iter()
            .map(|s| (s.domain().to_string(), Arc::new(s)))
            .collect();
        Self {
            listen,
            services,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Service whose domain equals `domain` exactly.
    pub fn service_by_domain(&self, domain: &str) -> Option<&Arc<Service>> {
        self.services.get(domain)
    }

    pub fn services(&self) -> impl Iterator<Item = &Arc<Service>> {
        self.services.values()
    }
}
