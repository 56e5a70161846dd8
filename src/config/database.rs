//! Database configuration
//!
//! Either a full `url` or the discrete connection parts. A `url`, when
//! present, wins over the parts.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::str::FromStr;
use std::time::Duration;

use super::error::ValidationError;

const SSL_MODES: [&str; 6] = ["disable", "allow", "prefer", "require", "verify-ca", "verify-full"];

/// PostgreSQL connection and pool settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` URL; overrides the parts below
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: SecretString,

    #[serde(default = "default_name")]
    pub name: String,

    /// libpq sslmode, e.g. `disable` or `require`
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Apply the bundled sqlx migrations on startup
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Builds sqlx connect options from the URL or the parts.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return PgConnectOptions::from_str(url);
        }

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
            .database(&self.name)
            .ssl_mode(PgSslMode::from_str(&self.ssl_mode)?))
    }

    /// Validate database configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                    return Err(ValidationError::InvalidDatabaseUrl);
                }
            }
            _ => {
                if self.host.trim().is_empty() {
                    return Err(ValidationError::MissingRequired("AUTOPAY__DATABASE__HOST"));
                }
                if self.name.trim().is_empty() {
                    return Err(ValidationError::MissingRequired("AUTOPAY__DATABASE__NAME"));
                }
                if self.port == 0 {
                    return Err(ValidationError::InvalidPort);
                }
                if !SSL_MODES.contains(&self.ssl_mode.as_str()) {
                    return Err(ValidationError::InvalidSslMode(self.ssl_mode.clone()));
                }
            }
        }

        if self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > 100 {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: default_password(),
            name: default_name(),
            ssl_mode: default_ssl_mode(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: false,
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_password() -> SecretString {
    SecretString::new("postgres".to_string())
}

fn default_name() -> String {
    "autopay".to_string()
}

fn default_ssl_mode() -> String {
    "disable".to_string()
}

fn default_min_connections() -> u32 {
    2
}

fn default_max_connections() -> u32 {
    20
}

fn default_acquire_timeout() -> u64 {
    30
}
