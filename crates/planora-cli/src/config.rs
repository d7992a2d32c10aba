//! Command-line and environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::{Args, Parser};
use planora_server::service::ServiceConfig;

use crate::TRACING_TARGET_CONFIG;

/// Planora API server.
#[derive(Debug, Parser)]
#[command(name = "planora", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub service: ServiceArgs,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Args)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Host address to bind the server to.
    ///
    /// Use "127.0.0.1" for localhost only, "0.0.0.0" for all interfaces.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// TCP port number for the server to listen on.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Maximum time in seconds to wait for graceful shutdown.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    /// Returns the socket address to bind to.
    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the graceful shutdown timeout.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Whether the server accepts connections from any interface.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.host {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr.is_unspecified(),
        }
    }
}

/// Session service configuration.
#[derive(Debug, Clone, Args)]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceArgs {
    /// Shared secret every token is signed and verified with.
    #[arg(long, env = "SIGNING_KEY")]
    pub signing_key: String,

    /// Access token lifetime in minutes.
    #[arg(long, env = "ACCESS_TOKEN_TTL_MINUTES", default_value_t = 15)]
    pub access_token_ttl_minutes: i64,

    /// Refresh token lifetime in minutes.
    #[arg(long, env = "REFRESH_TOKEN_TTL_MINUTES", default_value_t = 7 * 24 * 60)]
    pub refresh_token_ttl_minutes: i64,

    /// Public base URL used to build links in outbound email.
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = "http://localhost:8080")]
    pub public_base_url: String,
}

impl ServiceArgs {
    /// Builds the validated service configuration.
    pub fn into_service_config(self) -> anyhow::Result<ServiceConfig> {
        let config = ServiceConfig::builder()
            .with_signing_key(self.signing_key)
            .with_access_token_ttl_minutes(self.access_token_ttl_minutes)
            .with_refresh_token_ttl_minutes(self.refresh_token_ttl_minutes)
            .with_public_base_url(self.public_base_url)
            .build()?;
        Ok(config)
    }
}

/// Logs the effective server configuration.
pub fn log_server_config(config: &ServerConfig) {
    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        host = %config.host,
        port = config.port,
        shutdown_timeout_secs = config.shutdown_timeout,
        binds_to_all_interfaces = config.binds_to_all_interfaces(),
        "server configuration loaded"
    );
}
