//! Tenant configuration errors.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound / NotFoundForTenant | 404 |
//! | AlreadyExists | 409 |
//! | Inactive | 400 |
//! | ValidationFailed | 400 |
//! | CorruptCiphertext / Encryption / Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, TenantConfigId, ValidationError};

use super::TenantKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantConfigError {
    /// No config with this id.
    NotFound(TenantConfigId),

    /// No active config for this tenant.
    NotFoundForTenant(TenantKey),

    /// Config exists but is switched off.
    Inactive(TenantConfigId),

    /// A config for this (app, environment) pair already exists.
    AlreadyExists(TenantKey),

    ValidationFailed { field: String, message: String },

    /// Stored credentials could not be decrypted.
    CorruptCiphertext(String),

    /// Credentials could not be encrypted for storage.
    Encryption(String),

    Infrastructure(String),
}

impl TenantConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        TenantConfigError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        TenantConfigError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            TenantConfigError::NotFound(_) | TenantConfigError::NotFoundForTenant(_) => {
                ErrorCode::TenantConfigNotFound
            }
            TenantConfigError::Inactive(_) => ErrorCode::TenantConfigInactive,
            TenantConfigError::AlreadyExists(_) => ErrorCode::TenantConfigExists,
            TenantConfigError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            TenantConfigError::CorruptCiphertext(_) => ErrorCode::CorruptCiphertext,
            TenantConfigError::Encryption(_) => ErrorCode::EncryptionFailed,
            TenantConfigError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a client-safe error message.
    pub fn message(&self) -> String {
        match self {
            TenantConfigError::NotFound(id) => format!("Config not found: {}", id),
            TenantConfigError::NotFoundForTenant(key) => {
                format!("No active config found for {}", key)
            }
            TenantConfigError::Inactive(id) => format!("Config {} is inactive", id),
            TenantConfigError::AlreadyExists(_) => {
                "app_name and environment combination already exists".to_string()
            }
            TenantConfigError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            TenantConfigError::CorruptCiphertext(_) => {
                "Stored credentials could not be decrypted".to_string()
            }
            TenantConfigError::Encryption(_) => "Credentials could not be encrypted".to_string(),
            TenantConfigError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, TenantConfigError::Infrastructure(_))
    }
}

impl std::fmt::Display for TenantConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for TenantConfigError {}

impl From<ValidationError> for TenantConfigError {
    fn from(err: ValidationError) -> Self {
        TenantConfigError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for TenantConfigError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => TenantConfigError::ValidationFailed {
                field: err.detail("field").unwrap_or("unknown").to_string(),
                message: err.message,
            },
            ErrorCode::CorruptCiphertext => TenantConfigError::CorruptCiphertext(err.message),
            ErrorCode::EncryptionFailed => TenantConfigError::Encryption(err.message),
            _ => TenantConfigError::Infrastructure(err.to_string()),
        }
    }
}

impl From<TenantConfigError> for DomainError {
    fn from(err: TenantConfigError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
