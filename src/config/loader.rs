//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::model::Configuration;
use crate::config::schema::YamlConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::load_balancer::{Host, Service};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<Configuration, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    tracing::debug!(path = %path.display(), services = config.services().count(), "Configuration file loaded");
    Ok(config)
}

/// Parse and validate configuration from YAML text.
pub fn parse_config(content: &str) -> Result<Configuration, ConfigError> {
    let raw: YamlConfig = serde_yaml::from_str(content)?;
    validate_config(&raw).map_err(ConfigError::Validation)?;
    Ok(into_configuration(raw))
}

fn into_configuration(raw: YamlConfig) -> Configuration {
    let proxy = raw.proxy;
    let services = proxy.services.into_iter().map(|service| {
        let hosts = service
            .hosts
            .into_iter()
            .map(|h| Host::new(h.address, h.port))
            .collect();
        Service::new(service.name, service.domain, hosts)
    });

    Configuration::new(Host::new(proxy.listen.address, proxy.listen.port), services)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
proxy:
  listen:
    address: "127.0.0.1"
    port: 5000
  services:
    - name: service
      domain: service.com
      hosts:
        - address: "127.0.0.2"
          port: 5001
        - address: "127.0.0.3"
          port: 5002
    - name: other
      domain: other.com
      hosts: [{address: "10.0.0.1", port: 80}]
"#;

    #[test]
    fn test_to_configuration() {
        let config = parse_config(VALID).unwrap();

        assert_eq!(config.listen, Host::new("127.0.0.1", 5000));
        assert_eq!(config.services().count(), 2);
        assert_eq!(config.retry_policy.max_forward_retries, 0);
        assert!(config.retry_policy.retryable_status_codes.is_empty());

        let service = config.service_by_domain("service.com").unwrap();
        assert_eq!(service.name(), "service");
        assert_eq!(
            service.hosts(),
            &[Host::new("127.0.0.2", 5001), Host::new("127.0.0.3", 5002)]
        );
        assert_eq!(service.cursor(), 0);
        assert_eq!(config.service_by_domain("other.com").unwrap().cursor(), 0);
    }

    #[test]
    fn test_to_configuration_no_services() {
        let err = parse_config(
            r#"
proxy:
  listen: {address: "127.0.0.1", port: 5000}
  services: []
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e == &vec![ValidationError::NoServices]));
    }

    #[test]
    fn test_to_configuration_no_host_address() {
        let err = parse_config(
            r#"
proxy:
  listen: {address: "", port: 5000}
  services:
    - {name: service, domain: service.com, hosts: [{address: "127.0.0.2", port: 5001}]}
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e == &vec![ValidationError::EmptyListenAddress]));
    }

    #[test]
    fn test_to_configuration_no_host_port() {
        let err = parse_config(
            r#"
proxy:
  listen: {address: "127.0.0.1"}
  services:
    - {name: service, domain: service.com, hosts: [{address: "127.0.0.2", port: 5001}]}
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("listen port is zero"));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_config("proxy: [not, a, map").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(config.service_by_domain("service.com").is_some());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
