//! Listener, deployment environment and request limits.

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::tenant::GatewayEnvironment;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// Pins the gateway environment instead of deriving it from `environment`
    #[serde(default)]
    pub gateway_environment: Option<GatewayEnvironment>,

    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Upper bound on a single request, gateway calls included
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Where this process is deployed.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    #[serde(alias = "prod")]
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ValidationError::InvalidBindAddress(self.host.clone()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Gateway environment that app-name checkouts resolve against.
    ///
    /// Production deployments talk to live credentials, everything else to
    /// test credentials, unless `gateway_environment` pins one explicitly.
    pub fn gateway_environment(&self) -> GatewayEnvironment {
        match (self.gateway_environment, self.environment) {
            (Some(pinned), _) => pinned,
            (None, Environment::Production) => GatewayEnvironment::Live,
            (None, _) => GatewayEnvironment::Test,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=300).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        self.socket_addr().map(|_| ())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            gateway_environment: None,
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,autopay_backend=debug,sqlx=warn".to_string()
}

fn default_request_timeout() -> u64 {
    30
}
