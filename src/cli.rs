//! Command-line arguments.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::http::ServerSettings;
use crate::observability::logging::LogFormat;
use crate::resilience::RetryPolicy;
use crate::upstream::UpstreamSettings;

#[derive(Debug, Clone, Parser)]
#[command(name = "vhost-proxy")]
#[command(about = "Virtual-host reverse proxy with round-robin load balancing", long_about = None)]
pub struct Cli {
    /// Directory holding the configuration file
    #[arg(long, default_value = "proxy-configs")]
    pub config_dir: PathBuf,

    /// Configuration file name inside the config directory
    #[arg(long, default_value = "proxyConfig.yaml")]
    pub configuration_filename: String,

    /// Extra attempts on other instances after a retryable status
    #[arg(long, default_value_t = 2)]
    pub max_forward_retries: u32,

    /// Statuses that trigger a retry on the next instance
    #[arg(long, value_delimiter = ',', default_value = "500")]
    pub retryable_status_codes: Vec<u16>,

    /// Deadline for one upstream call, in seconds
    #[arg(long, default_value_t = 2)]
    pub upstream_timeout_secs: u64,

    /// Retries of the same instance on connection failure
    #[arg(long, default_value_t = 3)]
    pub upstream_max_retries: u32,

    /// Smallest wait between connection retries, in milliseconds
    #[arg(long, default_value_t = 50)]
    pub upstream_retry_wait_min_ms: u64,

    /// Largest wait between connection retries, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub upstream_retry_wait_max_ms: u64,

    /// Path prefix served by the proxy
    #[arg(long, default_value = "/api")]
    pub route_prefix: String,

    /// Largest accepted request body, in bytes
    #[arg(long, default_value_t = 2 * 1024 * 1024)]
    pub max_body_bytes: usize,

    /// Address for the Prometheus scrape endpoint (disabled when unset)
    #[arg(long)]
    pub metrics_address: Option<SocketAddr>,

    /// Log output format: pretty or json
    #[arg(long, default_value = "pretty")]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(&self.configuration_filename)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_forward_retries, self.retryable_status_codes.iter().copied())
    }

    pub fn upstream_settings(&self) -> UpstreamSettings {
        UpstreamSettings {
            request_timeout: Duration::from_secs(self.upstream_timeout_secs),
            max_retries: self.upstream_max_retries,
            retry_wait_min: Duration::from_millis(self.upstream_retry_wait_min_ms),
            retry_wait_max: Duration::from_millis(self.upstream_retry_wait_max_ms),
            ..UpstreamSettings::default()
        }
    }

    pub fn server_settings(&self) -> ServerSettings {
        ServerSettings {
            route_prefix: self.route_prefix.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["vhost-proxy"]).unwrap();

        assert_eq!(cli.config_path(), PathBuf::from("proxy-configs/proxyConfig.yaml"));
        assert_eq!(cli.log_format, LogFormat::Pretty);
        assert!(cli.metrics_address.is_none());

        let policy = cli.retry_policy();
        assert_eq!(policy.max_forward_retries, 2);
        assert!(policy.is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!policy.is_retryable(StatusCode::BAD_GATEWAY));

        let upstream = cli.upstream_settings();
        assert_eq!(upstream.request_timeout, Duration::from_secs(2));
        assert_eq!(upstream.max_retries, 3);
        assert_eq!(upstream.retry_wait_min, Duration::from_millis(50));
        assert_eq!(upstream.retry_wait_max, Duration::from_secs(1));

        let server = cli.server_settings();
        assert_eq!(server.route_prefix, "/api");
        assert_eq!(server.max_body_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn overrides() {
        let cli = Cli::try_parse_from([
            "vhost-proxy",
            "--config-dir",
            "/etc/proxy",
            "--configuration-filename",
            "prod.yaml",
            "--max-forward-retries",
            "0",
            "--retryable-status-codes",
            "502,503",
            "--metrics-address",
            "127.0.0.1:9090",
            "--log-format",
            "json",
            "--route-prefix",
            "/",
        ])
        .unwrap();

        assert_eq!(cli.config_path(), PathBuf::from("/etc/proxy/prod.yaml"));
        assert_eq!(cli.retryable_status_codes, vec![502, 503]);
        assert_eq!(cli.retry_policy().max_forward_retries, 0);
        assert_eq!(cli.metrics_address, Some("127.0.0.1:9090".parse().unwrap()));
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.route_prefix, "/");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Cli::try_parse_from(["vhost-proxy", "--retryable-status-codes", "abc"]).is_err());
        assert!(Cli::try_parse_from(["vhost-proxy", "--log-format", "xml"]).is_err());
        assert!(Cli::try_parse_from(["vhost-proxy", "--metrics-address", "nowhere"]).is_err());
    }
}
