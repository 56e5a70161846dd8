//! Payment configuration: credential encryption and the gateway endpoint.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Payment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// AES key for tenant credentials at rest. Its byte length picks
    /// AES-128, AES-192 or AES-256.
    pub encryption_key: SecretString,

    /// Gateway API root
    #[serde(default = "default_gateway_base_url")]
    pub gateway_base_url: String,

    /// Per-request timeout for gateway calls in seconds
    #[serde(default = "default_gateway_timeout")]
    pub gateway_timeout_secs: u64,
}

impl PaymentConfig {
    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let key_len = self.encryption_key.expose_secret().len();
        if key_len == 0 {
            return Err(ValidationError::MissingRequired("AUTOPAY__PAYMENT__ENCRYPTION_KEY"));
        }
        if !matches!(key_len, 16 | 24 | 32) {
            return Err(ValidationError::InvalidEncryptionKeyLength(key_len));
        }
        if !self.gateway_base_url.starts_with("https://")
            && !self.gateway_base_url.starts_with("http://")
        {
            return Err(ValidationError::InvalidGatewayUrl);
        }
        if !(1..=120).contains(&self.gateway_timeout_secs) {
            return Err(ValidationError::InvalidGatewayTimeout);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            encryption_key: SecretString::new(String::new()),
            gateway_base_url: default_gateway_base_url(),
            gateway_timeout_secs: default_gateway_timeout(),
        }
    }
}

fn default_gateway_base_url() -> String {
    crate::adapters::razorpay::DEFAULT_BASE_URL.to_string()
}

fn default_gateway_timeout() -> u64 {
    20
}
