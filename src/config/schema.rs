//! Configuration file schema.
//!
//! Mirrors the on-disk YAML layout one to one. Nothing here is used at
//! request time; the loader converts it into [`Configuration`] after
//! validation.
//!
//! ```yaml
//! proxy:
//!   listen:
//!     address: 127.0.0.1
//!     port: 8080
//!   services:
//!     - name: my-service
//!       domain: my-domain.com
//!       hosts:
//!         - address: 127.0.0.1
//!           port: 5000
//! ```
//!
//! [`Configuration`]: crate::config::Configuration

use serde::{Deserialize, Serialize};

/// Root of the configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct YamlConfig {
    pub proxy: ProxySection,
}

/// The `proxy` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProxySection {
    /// Address the proxy listens on.
    pub listen: HostEntry,

    /// Downstream services, keyed at load time by their domain.
    pub services: Vec<ServiceEntry>,
}

/// A downstream service and its instance pool.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServiceEntry {
    pub name: String,

    /// Virtual host matched exactly against the inbound `Host` header.
    pub domain: String,

    /// Instances in rotation order.
    pub hosts: Vec<HostEntry>,
}

/// An `address`/`port` pair.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HostEntry {
    pub address: String,
    pub port: u16,
}

impl HostEntry {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}
