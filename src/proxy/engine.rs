//! Forwarding engine: resolve, select, send, rotate, retry.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Configuration;
use crate::load_balancer::{LoadBalancer, RoundRobin};
use crate::proxy::{Forwarder, ProxyRequest};
use crate::upstream::{outcome_status, ForwardError, UpstreamClient, UpstreamResponse};

/// Forwards requests with bounded retry across a service's instances.
#[derive(Debug)]
pub struct ForwardingEngine<C, L = RoundRobin> {
    config: Arc<Configuration>,
    client: C,
    balancer: L,
}

impl<C: UpstreamClient> ForwardingEngine<C, RoundRobin> {
    pub fn new(config: Arc<Configuration>, client: C) -> Self {
        Self::with_balancer(config, client, RoundRobin::new())
    }
}

impl<C: UpstreamClient, L: LoadBalancer> ForwardingEngine<C, L> {
    pub fn with_balancer(config: Arc<Configuration>, client: C, balancer: L) -> Self {
        Self {
            config,
            client,
            balancer,
        }
    }

    pub fn config(&self) -> &Arc<Configuration> {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: UpstreamClient, L: LoadBalancer> Forwarder for ForwardingEngine<C, L> {
    async fn forward(&self, request: &ProxyRequest) -> Result<UpstreamResponse, ForwardError> {
        let Some(service) = self.config.service_by_domain(&request.host) else {
            tracing::debug!(host = %request.host, "No service configured for host");
            return Ok(UpstreamResponse::not_found());
        };

        let policy = &self.config.retry_policy;
        let mut attempts = 0;

        loop {
            // Claiming the slot advances the rotation, whatever the outcome.
            let host = self
                .balancer
                .next_host(service)
                .ok_or_else(|| ForwardError::NoInstances {
                    service: service.name().to_string(),
                })?;
            let target = host.target();

            let outcome = self
                .client
                .send(
                    &request.method,
                    &target,
                    &request.headers,
                    request.query.as_deref(),
                    request.body.clone(),
                )
                .await;
            attempts += 1;

            let status = outcome_status(&outcome);
            if !policy.should_retry(attempts, status) {
                tracing::debug!(
                    service = service.name(),
                    target = %target,
                    status = %status,
                    attempts,
                    "Forward finished"
                );
                return outcome;
            }

            tracing::info!(
                service = service.name(),
                target = %target,
                status = %status,
                attempt = attempts,
                "Retryable status, trying next instance"
            );
        }
    }
}
