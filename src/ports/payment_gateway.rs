//! Payment gateway port.
//!
//! A [`PaymentGateway`] is a client handle bound to one tenant's
//! credentials. Handles are built by a [`GatewayConnector`] and shared
//! through a [`GatewayResolver`].

use crate::domain::subscription::BillingPeriod;
use crate::domain::tenant::{GatewayCredentials, TenantConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Subscription API of the gateway, bound to one tenant.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a subscription and returns its hosted checkout link.
    async fn create_subscription(
        &self,
        request: &CreateSubscriptionRequest,
    ) -> Result<GatewaySubscription, GatewayError>;

    /// Fetches a plan's price and billing period.
    async fn fetch_plan(&self, plan_id: &str) -> Result<GatewayPlan, GatewayError>;

    /// Fetches the gateway's view of a subscription.
    async fn fetch_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<GatewaySubscription, GatewayError>;

    /// Cancels a subscription.
    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        options: CancelOptions,
    ) -> Result<GatewaySubscription, GatewayError>;
}

/// Builds gateway handles from tenant credentials.
pub trait GatewayConnector: Send + Sync {
    fn connect(&self, credentials: &GatewayCredentials) -> Result<Arc<dyn PaymentGateway>, GatewayError>;
}

/// Hands out the gateway handle for a tenant config.
///
/// Implementations may cache handles per tenant.
pub trait GatewayResolver: Send + Sync {
    fn resolve(&self, config: &TenantConfig) -> Result<Arc<dyn PaymentGateway>, GatewayError>;
}

/// Subscription creation payload, in the gateway's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub plan_id: String,
    pub quantity: u32,
    pub customer_notify: bool,
    pub total_count: u32,

    /// Unix time the checkout link stops working.
    pub expire_by: i64,

    /// Unix time of the first recurring charge.
    pub start_at: i64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addons: Vec<Addon>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Map<String, Value>>,
}

/// One-time charge attached to a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
    pub item: AddonItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonItem {
    pub name: String,
    /// Minor units.
    pub amount: i64,
    pub currency: String,
}

/// Subscription as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySubscription {
    pub id: String,
    pub plan_id: String,
    pub status: String,
    #[serde(default)]
    pub short_url: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
}

/// Plan as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPlan {
    pub id: String,
    pub period: String,
    pub interval: u32,
    pub item: PlanItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    #[serde(default)]
    pub name: Option<String>,
    /// Minor units.
    pub amount: i64,
    pub currency: String,
}

impl GatewayPlan {
    pub fn billing_period(&self) -> BillingPeriod {
        BillingPeriod::parse(&self.period)
    }
}

/// Cancellation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CancelOptions {
    /// Keep the subscription running until the current cycle ends.
    pub at_cycle_end: bool,
}

impl CancelOptions {
    pub fn immediately() -> Self {
        Self { at_cycle_end: false }
    }
}

/// Categories of gateway failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// The gateway rejected the request (4xx other than auth / not found).
    InvalidRequest,
    /// Credentials were refused.
    Authentication,
    /// The referenced plan or subscription does not exist.
    NotFound,
    RateLimited,
    /// Transport failure or timeout.
    Network,
    /// Gateway-side failure (5xx).
    Upstream,
    /// The response body could not be decoded.
    InvalidResponse,
}

impl GatewayErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::RateLimited | GatewayErrorCode::Network | GatewayErrorCode::Upstream
        )
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::InvalidRequest => "invalid_request",
            GatewayErrorCode::Authentication => "authentication",
            GatewayErrorCode::NotFound => "not_found",
            GatewayErrorCode::RateLimited => "rate_limited",
            GatewayErrorCode::Network => "network",
            GatewayErrorCode::Upstream => "upstream",
            GatewayErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}

/// Errors from gateway operations. Messages never contain credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub code: GatewayErrorCode,
    pub message: String,
    /// Gateway's own error code, when it sent one.
    pub provider_code: Option<String>,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Network, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(GatewayErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidRequest, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// True when the request itself was at fault.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self.code,
            GatewayErrorCode::InvalidRequest | GatewayErrorCode::NotFound
        )
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_to_gateway_shape() {
        let request = CreateSubscriptionRequest {
            plan_id: "plan_1".to_string(),
            quantity: 1,
            customer_notify: false,
            total_count: 120,
            expire_by: 1_700_604_800,
            start_at: 1_700_086_400,
            addons: vec![Addon {
                item: AddonItem {
                    name: "Initial Charge".to_string(),
                    amount: 100,
                    currency: "INR".to_string(),
                },
            }],
            notes: None,
        };

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["customer_notify"], json!(false));
        assert_eq!(value["addons"][0]["item"]["amount"], json!(100));
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn empty_addons_are_omitted() {
        let request = CreateSubscriptionRequest {
            plan_id: "plan_1".to_string(),
            quantity: 1,
            customer_notify: false,
            total_count: 120,
            expire_by: 0,
            start_at: 0,
            addons: vec![],
            notes: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("addons").is_none());
    }

    #[test]
    fn plan_exposes_billing_period() {
        let plan: GatewayPlan = serde_json::from_value(json!({
            "id": "plan_1",
            "period": "monthly",
            "interval": 1,
            "item": {"name": "Gold", "amount": 49900, "currency": "INR"}
        }))
        .unwrap();

        assert_eq!(plan.billing_period(), BillingPeriod::Monthly);
        assert_eq!(plan.item.amount, 49_900);
    }

    #[test]
    fn retryability_follows_code() {
        assert!(GatewayError::network("timeout").is_retryable());
        assert!(!GatewayError::invalid_request("bad plan").is_retryable());
        assert!(GatewayError::not_found("plan").is_client_fault());
    }
}
