//! Tenant gateway configuration.
//!
//! A tenant is an (application, environment) pair with its own gateway
//! credentials. Credentials are held as `SecretString` so `Debug` output
//! never reveals them.

use crate::domain::foundation::{TenantConfigId, Timestamp, ValidationError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::TenantConfigError;

pub const MAX_APP_NAME_LEN: usize = 100;

/// Gateway environment a credential set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayEnvironment {
    #[default]
    Test,
    Live,
}

impl GatewayEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayEnvironment::Test => "test",
            GatewayEnvironment::Live => "live",
        }
    }
}

impl fmt::Display for GatewayEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GatewayEnvironment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(GatewayEnvironment::Test),
            "live" => Ok(GatewayEnvironment::Live),
            _ => Err(ValidationError::invalid_format(
                "environment",
                "must be 'test' or 'live'",
            )),
        }
    }
}

/// Composite tenant identity: (app name, environment).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantKey {
    app_name: String,
    environment: GatewayEnvironment,
}

impl TenantKey {
    pub fn new(app_name: impl Into<String>, environment: GatewayEnvironment) -> Result<Self, ValidationError> {
        let app_name = app_name.into().trim().to_string();
        if app_name.is_empty() {
            return Err(ValidationError::empty_field("app_name"));
        }
        let len = app_name.chars().count();
        if len > MAX_APP_NAME_LEN {
            return Err(ValidationError::too_long("app_name", MAX_APP_NAME_LEN, len));
        }
        Ok(Self {
            app_name,
            environment,
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn environment(&self) -> GatewayEnvironment {
        self.environment
    }
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_name, self.environment)
    }
}

/// Decrypted gateway credentials of one tenant.
#[derive(Debug, Clone)]
pub struct GatewayCredentials {
    key_id: SecretString,
    key_secret: SecretString,
    webhook_secret: SecretString,
}

impl GatewayCredentials {
    pub fn new(
        key_id: SecretString,
        key_secret: SecretString,
        webhook_secret: SecretString,
    ) -> Result<Self, ValidationError> {
        require_secret("razorpay_key_id", &key_id)?;
        require_secret("razorpay_key_secret", &key_secret)?;
        require_secret("razorpay_webhook_secret", &webhook_secret)?;
        Ok(Self {
            key_id,
            key_secret,
            webhook_secret,
        })
    }

    pub fn key_id(&self) -> &SecretString {
        &self.key_id
    }

    pub fn key_secret(&self) -> &SecretString {
        &self.key_secret
    }

    pub fn webhook_secret(&self) -> &SecretString {
        &self.webhook_secret
    }
}

fn require_secret(field: &str, value: &SecretString) -> Result<(), ValidationError> {
    if value.expose_secret().trim().is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(())
}

/// Partial update of a tenant config. Tenant identity is not updatable.
#[derive(Debug, Clone, Default)]
pub struct TenantConfigChanges {
    pub key_id: Option<SecretString>,
    pub key_secret: Option<SecretString>,
    pub webhook_secret: Option<SecretString>,
    pub is_active: Option<bool>,
    pub metadata: Option<Map<String, Value>>,
}

/// A tenant's gateway configuration with decrypted credentials.
#[derive(Debug, Clone)]
pub struct TenantConfig {
    pub id: TenantConfigId,
    pub tenant: TenantKey,
    pub credentials: GatewayCredentials,
    pub is_active: bool,
    pub metadata: Map<String, Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TenantConfig {
    pub fn new(
        tenant: TenantKey,
        credentials: GatewayCredentials,
        is_active: bool,
        metadata: Map<String, Value>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: TenantConfigId::new(),
            tenant,
            credentials,
            is_active,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rejects inactive configs when selecting one for a new checkout.
    pub fn ensure_active(&self) -> Result<(), TenantConfigError> {
        if self.is_active {
            Ok(())
        } else {
            Err(TenantConfigError::Inactive(self.id))
        }
    }

    /// Merges the supplied fields. Blank secrets are rejected.
    pub fn apply(&mut self, changes: TenantConfigChanges, now: Timestamp) -> Result<(), ValidationError> {
        let credentials = GatewayCredentials::new(
            changes.key_id.unwrap_or_else(|| self.credentials.key_id.clone()),
            changes
                .key_secret
                .unwrap_or_else(|| self.credentials.key_secret.clone()),
            changes
                .webhook_secret
                .unwrap_or_else(|| self.credentials.webhook_secret.clone()),
        )?;

        self.credentials = credentials;
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        if let Some(metadata) = changes.metadata {
            self.metadata = metadata;
        }
        self.updated_at = now;
        Ok(())
    }
}
