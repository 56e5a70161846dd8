//! HTTP DTOs for subscription endpoints.
//!
//! Request bodies default missing fields so that absent values reach the
//! handlers and come back as field-level validation errors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{Page, Timestamp};
use crate::domain::subscription::{ReconcileOutcome, Subscription, SubscriptionStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /subscriptions/checkout`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateCheckoutRequest {
    pub user_id: String,
    /// Explicit tenant config. Older clients send it as `client_id`.
    #[serde(alias = "client_id")]
    pub config_id: Option<String>,
    pub app_name: String,
    pub phone: String,
    pub email: String,
    pub plan_id: String,
    pub total_count: Option<i64>,
    /// Unix seconds.
    pub start_at: Option<i64>,
    pub quantity: Option<i64>,
    pub notes: Option<Map<String, Value>>,
    /// Whole currency units.
    pub initial_charge_amount: Option<i64>,
    pub first_charge_delay_days: Option<i64>,
}

/// Body of `POST /subscriptions/verify`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VerifyPaymentRequest {
    pub razorpay_payment_id: String,
    pub razorpay_subscription_id: String,
    pub razorpay_signature: String,
}

/// Query of the contact lookups.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactQuery {
    pub phone: String,
    pub app_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListSubscriptionsParams {
    pub app_name: Option<String>,
    pub config_id: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub subscription_id: String,
    pub razorpay_subscription_id: String,
    pub short_url: String,
    pub status: SubscriptionStatus,
}

impl From<&Subscription> for CheckoutResponse {
    fn from(s: &Subscription) -> Self {
        Self {
            subscription_id: s.id.to_string(),
            razorpay_subscription_id: s.gateway_subscription_id().unwrap_or_default().to_string(),
            short_url: s.short_url().to_string(),
            status: s.status,
        }
    }
}

/// Public view of a subscription.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub user_id: String,
    pub app_name: String,
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razorpay_subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razorpay_customer_id: Option<String>,
    pub razorpay_plan_id: String,
    pub status: SubscriptionStatus,
    pub amount: i64,
    pub currency: String,
    pub frequency: String,
    pub total_count: u32,
    pub short_url: String,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub next_charge_at: Option<Timestamp>,
    pub metadata: Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id.to_string(),
            user_id: s.user_id.to_string(),
            razorpay_subscription_id: s.gateway_subscription_id().map(str::to_string),
            short_url: s.short_url().to_string(),
            metadata: s.metadata.to_value(),
            app_name: s.app_name,
            phone: s.phone,
            email: s.email,
            razorpay_customer_id: s.gateway_customer_id,
            razorpay_plan_id: s.gateway_plan_id,
            status: s.status,
            amount: s.amount,
            currency: s.currency,
            frequency: s.frequency,
            total_count: s.total_count,
            start_at: s.start_at,
            end_at: s.end_at,
            next_charge_at: s.next_charge_at,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyPaymentResponse {
    pub subscription: SubscriptionResponse,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    pub outcome: &'static str,
}

impl From<ReconcileOutcome> for WebhookResponse {
    fn from(outcome: ReconcileOutcome) -> Self {
        let outcome = match outcome {
            ReconcileOutcome::Ignored(_) => "ignored",
            _ => "applied",
        };
        Self {
            status: "ok",
            outcome,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelResponse {
    pub message: String,
    pub subscription_id: String,
}

pub type SubscriptionPage = Page<SubscriptionResponse>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::test_support::new_subscription;
    use crate::domain::subscription::IgnoreReason;

    #[test]
    fn checkout_request_accepts_client_id_alias() {
        let request: CreateCheckoutRequest = serde_json::from_value(serde_json::json!({
            "client_id": "6f1c1f9e-3d5b-4c38-9d0e-4f7c86a8f0a1",
            "plan_id": "plan_1"
        }))
        .unwrap();

        assert_eq!(
            request.config_id.as_deref(),
            Some("6f1c1f9e-3d5b-4c38-9d0e-4f7c86a8f0a1")
        );
        assert!(request.phone.is_empty());
    }

    #[test]
    fn subscription_response_uses_gateway_field_names() {
        let subscription = new_subscription(SubscriptionStatus::Active);

        let value = serde_json::to_value(SubscriptionResponse::from(subscription)).unwrap();

        assert_eq!(value["razorpay_subscription_id"], "sub_test_1");
        assert_eq!(value["razorpay_plan_id"], "plan_monthly");
        assert_eq!(value["status"], "active");
        assert_eq!(value["amount"], 49_900);
    }

    #[test]
    fn webhook_response_labels_outcomes() {
        let ignored = WebhookResponse::from(ReconcileOutcome::Ignored(IgnoreReason::UnknownEvent));
        let applied = WebhookResponse::from(ReconcileOutcome::StatusChanged {
            from: SubscriptionStatus::Active,
            to: SubscriptionStatus::Paused,
        });

        assert_eq!(ignored.outcome, "ignored");
        assert_eq!(applied.outcome, "applied");
    }
}
