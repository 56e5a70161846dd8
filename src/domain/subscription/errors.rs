//! Subscription-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound / GatewayIdNotFound | 404 |
//! | ConfigNotFound | 404 |
//! | ConfigInactive | 400 |
//! | ValidationFailed / MalformedWebhook | 400 |
//! | InvalidPaymentSignature / InvalidWebhookSignature | 401 |
//! | GatewayRejected | 400 |
//! | GatewayUnavailable | 502 |
//! | OrphanedGatewaySubscription | 500 |
//! | CredentialsUnavailable / Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, ValidationError};
use crate::domain::tenant::TenantConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// No subscription with this internal id.
    NotFound(SubscriptionId),

    /// No subscription with this gateway subscription id.
    GatewayIdNotFound(String),

    /// No latest subscription for this contact.
    NotFoundForContact { phone: String, app_name: String },

    /// The tenant config could not be resolved.
    ConfigNotFound(String),

    /// The tenant config exists but is inactive.
    ConfigInactive(String),

    ValidationFailed { field: String, message: String },

    /// The webhook body lacks the fields needed to route or apply it.
    MalformedWebhook(String),

    /// Checkout callback signature did not match.
    InvalidPaymentSignature,

    /// Webhook signature did not match.
    InvalidWebhookSignature,

    /// The gateway refused the request (bad plan id, bad parameters).
    GatewayRejected { context: String, reason: String },

    /// The gateway could not be reached or failed.
    GatewayUnavailable { context: String, reason: String },

    /// The gateway created a subscription that could not be stored locally.
    OrphanedGatewaySubscription {
        gateway_subscription_id: String,
        reason: String,
    },

    /// Tenant credentials could not be decrypted.
    CredentialsUnavailable(String),

    Infrastructure(String),
}

impl SubscriptionError {
    pub fn not_found(id: SubscriptionId) -> Self {
        SubscriptionError::NotFound(id)
    }

    pub fn gateway_id_not_found(gateway_subscription_id: impl Into<String>) -> Self {
        SubscriptionError::GatewayIdNotFound(gateway_subscription_id.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn malformed_webhook(reason: impl Into<String>) -> Self {
        SubscriptionError::MalformedWebhook(reason.into())
    }

    pub fn orphaned(gateway_subscription_id: impl Into<String>, reason: impl Into<String>) -> Self {
        SubscriptionError::OrphanedGatewaySubscription {
            gateway_subscription_id: gateway_subscription_id.into(),
            reason: reason.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::NotFound(_)
            | SubscriptionError::GatewayIdNotFound(_)
            | SubscriptionError::NotFoundForContact { .. } => ErrorCode::SubscriptionNotFound,
            SubscriptionError::ConfigNotFound(_) => ErrorCode::TenantConfigNotFound,
            SubscriptionError::ConfigInactive(_) => ErrorCode::TenantConfigInactive,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::MalformedWebhook(_) => ErrorCode::InvalidFormat,
            SubscriptionError::InvalidPaymentSignature => ErrorCode::InvalidPaymentSignature,
            SubscriptionError::InvalidWebhookSignature => ErrorCode::InvalidWebhookSignature,
            SubscriptionError::GatewayRejected { .. } => ErrorCode::GatewayRejected,
            SubscriptionError::GatewayUnavailable { .. } => ErrorCode::GatewayUnavailable,
            SubscriptionError::OrphanedGatewaySubscription { .. } => {
                ErrorCode::OrphanedGatewaySubscription
            }
            SubscriptionError::CredentialsUnavailable(_) => ErrorCode::CorruptCiphertext,
            SubscriptionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a client-safe error message.
    pub fn message(&self) -> String {
        match self {
            SubscriptionError::NotFound(id) => format!("Subscription not found: {}", id),
            SubscriptionError::GatewayIdNotFound(gateway_id) => {
                format!("Subscription not found for razorpay id: {}", gateway_id)
            }
            SubscriptionError::NotFoundForContact { phone, app_name } => {
                format!("No subscription found for phone {} in app {}", phone, app_name)
            }
            SubscriptionError::ConfigNotFound(what) => format!("Config not found: {}", what),
            SubscriptionError::ConfigInactive(what) => format!("Config is inactive: {}", what),
            SubscriptionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SubscriptionError::MalformedWebhook(reason) => {
                format!("Malformed webhook payload: {}", reason)
            }
            SubscriptionError::InvalidPaymentSignature => "Invalid payment signature".to_string(),
            SubscriptionError::InvalidWebhookSignature => "Invalid webhook signature".to_string(),
            SubscriptionError::GatewayRejected { context, reason } => {
                format!("Gateway rejected {}: {}", context, reason)
            }
            SubscriptionError::GatewayUnavailable { context, reason } => {
                format!("Gateway call failed ({}): {}", context, reason)
            }
            SubscriptionError::OrphanedGatewaySubscription {
                gateway_subscription_id,
                ..
            } => format!(
                "Subscription {} was created at the gateway but could not be saved",
                gateway_subscription_id
            ),
            SubscriptionError::CredentialsUnavailable(_) => {
                "Tenant credentials are unavailable".to_string()
            }
            SubscriptionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubscriptionError::GatewayUnavailable { .. } | SubscriptionError::Infrastructure(_)
        )
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SubscriptionError {}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        SubscriptionError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => SubscriptionError::ValidationFailed {
                field: err.detail("field").unwrap_or("unknown").to_string(),
                message: err.message,
            },
            ErrorCode::CorruptCiphertext | ErrorCode::EncryptionFailed => {
                SubscriptionError::CredentialsUnavailable(err.message)
            }
            _ => SubscriptionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<TenantConfigError> for SubscriptionError {
    fn from(err: TenantConfigError) -> Self {
        match err {
            TenantConfigError::NotFound(id) => SubscriptionError::ConfigNotFound(id.to_string()),
            TenantConfigError::NotFoundForTenant(key) => {
                SubscriptionError::ConfigNotFound(key.to_string())
            }
            TenantConfigError::Inactive(id) => SubscriptionError::ConfigInactive(id.to_string()),
            TenantConfigError::ValidationFailed { field, message } => {
                SubscriptionError::ValidationFailed { field, message }
            }
            TenantConfigError::CorruptCiphertext(msg) | TenantConfigError::Encryption(msg) => {
                SubscriptionError::CredentialsUnavailable(msg)
            }
            TenantConfigError::AlreadyExists(key) => {
                SubscriptionError::Infrastructure(format!("unexpected config conflict for {}", key))
            }
            TenantConfigError::Infrastructure(msg) => SubscriptionError::Infrastructure(msg),
        }
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TenantConfigId;

    #[test]
    fn signature_errors_are_not_retryable() {
        assert!(!SubscriptionError::InvalidPaymentSignature.is_retryable());
        assert!(!SubscriptionError::InvalidWebhookSignature.is_retryable());
    }

    #[test]
    fn gateway_outage_is_retryable_but_rejection_is_not() {
        let outage = SubscriptionError::GatewayUnavailable {
            context: "create subscription for plan plan_1".to_string(),
            reason: "timeout".to_string(),
        };
        let rejected = SubscriptionError::GatewayRejected {
            context: "create subscription for plan plan_1".to_string(),
            reason: "plan does not exist".to_string(),
        };
        assert!(outage.is_retryable());
        assert!(!rejected.is_retryable());
        assert!(rejected.message().contains("plan_1"));
    }

    #[test]
    fn tenant_errors_map_to_config_variants() {
        let id = TenantConfigId::new();
        let err: SubscriptionError = TenantConfigError::Inactive(id).into();
        assert_eq!(err.code(), ErrorCode::TenantConfigInactive);

        let err: SubscriptionError = TenantConfigError::NotFound(id).into();
        assert_eq!(err.code(), ErrorCode::TenantConfigNotFound);
    }

    #[test]
    fn orphan_message_names_gateway_id() {
        let err = SubscriptionError::orphaned("sub_123", "unique violation");
        assert!(err.message().contains("sub_123"));
        assert_eq!(err.code(), ErrorCode::OrphanedGatewaySubscription);
    }

    #[test]
    fn domain_database_error_becomes_infrastructure() {
        let err: SubscriptionError = DomainError::database("boom").into();
        assert!(matches!(err, SubscriptionError::Infrastructure(_)));
    }
}
