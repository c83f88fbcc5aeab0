//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject configurations the proxy cannot serve: no services, no listen
//!   address, services without instances
//! - Detect domains claimed by more than one service
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: YamlConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{HostEntry, YamlConfig};

/// A single semantic problem in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no services configured")]
    NoServices,

    #[error("listen address is empty")]
    EmptyListenAddress,

    #[error("listen port is zero")]
    ZeroListenPort,

    #[error("service '{service}' has an empty domain")]
    EmptyDomain { service: String },

    #[error("domain '{domain}' is configured more than once")]
    DuplicateDomain { domain: String },

    #[error("service '{service}' has no hosts")]
    NoHosts { service: String },

    #[error("service '{service}' host #{index} is invalid: {reason}")]
    InvalidHost {
        service: String,
        index: usize,
        reason: &'static str,
    },
}

/// Validate a parsed configuration file.
pub fn validate_config(config: &YamlConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let proxy = &config.proxy;

    if proxy.services.is_empty() {
        errors.push(ValidationError::NoServices);
    }
    if proxy.listen.address.trim().is_empty() {
        errors.push(ValidationError::EmptyListenAddress);
    }
    if proxy.listen.port == 0 {
        errors.push(ValidationError::ZeroListenPort);
    }

    let mut domains = HashSet::new();
    for service in &proxy.services {
        if service.domain.is_empty() {
            errors.push(ValidationError::EmptyDomain {
                service: service.name.clone(),
            });
        } else if !domains.insert(service.domain.as_str()) {
            errors.push(ValidationError::DuplicateDomain {
                domain: service.domain.clone(),
            });
        }

        if service.hosts.is_empty() {
            errors.push(ValidationError::NoHosts {
                service: service.name.clone(),
            });
        }

        for (index, host) in service.hosts.iter().enumerate() {
            if let Some(reason) = host_problem(host) {
                errors.push(ValidationError::InvalidHost {
                    service: service.name.clone(),
                    index,
                    reason,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn host_problem(host: &HostEntry) -> Option<&'static str> {
    if host.address.trim().is_empty() {
        Some("empty address")
    } else if host.port == 0 {
        Some("zero port")
    } else {
        None
    }
}
