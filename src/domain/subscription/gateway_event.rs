//! Gateway webhook event types.
//!
//! Parsing happens in two phases. [`routing_subscription_id`] reads only the
//! subscription id from an unverified body, which is enough to find the
//! tenant whose webhook secret signs it. [`GatewayEvent::decode`] reads the
//! full event and accepts only a [`VerifiedBody`], obtainable solely through
//! a successful signature check.

use crate::domain::foundation::Timestamp;
use secrecy::SecretString;
use serde::Deserialize;

use super::signature::verify_webhook_signature;
use super::SubscriptionError;

// ════════════════════════════════════════════════════════════════════════════
// Phase one: untrusted routing
// ════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct RoutingEnvelope {
    payload: Option<RoutingPayload>,
}

#[derive(Deserialize)]
struct RoutingPayload {
    subscription: Option<RoutingWrapper>,
}

#[derive(Deserialize)]
struct RoutingWrapper {
    entity: Option<RoutingEntity>,
}

#[derive(Deserialize)]
struct RoutingEntity {
    id: Option<String>,
}

/// Extracts `payload.subscription.entity.id` from an unverified body.
///
/// Nothing else is read before the signature is checked.
pub fn routing_subscription_id(body: &[u8]) -> Result<String, SubscriptionError> {
    let envelope: RoutingEnvelope = serde_json::from_slice(body)
        .map_err(|e| SubscriptionError::malformed_webhook(format!("invalid JSON: {}", e)))?;

    envelope
        .payload
        .and_then(|p| p.subscription)
        .and_then(|s| s.entity)
        .and_then(|e| e.id)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            SubscriptionError::malformed_webhook("payload.subscription.entity.id is missing")
        })
}

// ════════════════════════════════════════════════════════════════════════════
// Phase two: verified decode
// ════════════════════════════════════════════════════════════════════════════

/// A webhook body whose signature has been checked.
#[derive(Debug, Clone, Copy)]
pub struct VerifiedBody<'a> {
    body: &'a [u8],
}

impl<'a> VerifiedBody<'a> {
    /// Checks the body against the tenant's webhook secret.
    pub fn verify(
        body: &'a [u8],
        signature: &str,
        webhook_secret: &SecretString,
    ) -> Result<Self, SubscriptionError> {
        if verify_webhook_signature(body, signature, webhook_secret) {
            Ok(Self { body })
        } else {
            Err(SubscriptionError::InvalidWebhookSignature)
        }
    }
}

/// Gateway webhook event (fields we act on).
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayEvent {
    /// Event name, e.g. `subscription.charged`.
    pub event: String,

    #[serde(default)]
    pub account_id: Option<String>,

    pub payload: EventPayload,

    /// Unix time the gateway emitted the event.
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    pub subscription: EntityWrapper<SubscriptionEntity>,

    #[serde(default)]
    pub payment: Option<EntityWrapper<PaymentEntity>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityWrapper<T> {
    pub entity: T,
}

/// Subscription snapshot carried by the event. Times are Unix seconds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionEntity {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub start_at: Option<i64>,
    #[serde(default)]
    pub charge_at: Option<i64>,
    #[serde(default)]
    pub end_at: Option<i64>,
    #[serde(default)]
    pub ended_at: Option<i64>,
}

impl SubscriptionEntity {
    pub fn start_time(&self) -> Option<Timestamp> {
        self.start_at.and_then(Timestamp::from_unix_secs)
    }

    pub fn charge_time(&self) -> Option<Timestamp> {
        self.charge_at.and_then(Timestamp::from_unix_secs)
    }

    pub fn end_time(&self) -> Option<Timestamp> {
        self.end_at.and_then(Timestamp::from_unix_secs)
    }

    pub fn ended_time(&self) -> Option<Timestamp> {
        self.ended_at.and_then(Timestamp::from_unix_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    #[serde(default)]
    pub amount: Option<i64>,
}

impl GatewayEvent {
    /// Decodes a verified body.
    pub fn decode(body: VerifiedBody<'_>) -> Result<Self, SubscriptionError> {
        serde_json::from_slice(body.body)
            .map_err(|e| SubscriptionError::malformed_webhook(e.to_string()))
    }

    pub fn kind(&self) -> WebhookEventKind {
        WebhookEventKind::parse(&self.event)
    }

    pub fn subscription(&self) -> &SubscriptionEntity {
        &self.payload.subscription.entity
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.payload.payment.as_ref().map(|p| p.entity.id.as_str())
    }
}

/// Subscription events the reconciler understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventKind {
    Authenticated,
    Activated,
    Charged,
    Pending,
    Halted,
    Cancelled,
    Completed,
    Paused,
    Resumed,
    /// Anything else; ignored for forward compatibility.
    Unknown,
}

impl WebhookEventKind {
    pub fn parse(event: &str) -> Self {
        match event {
            "subscription.authenticated" => Self::Authenticated,
            "subscription.activated" => Self::Activated,
            "subscription.charged" => Self::Charged,
            "subscription.pending" => Self::Pending,
            "subscription.halted" => Self::Halted,
            "subscription.cancelled" => Self::Cancelled,
            "subscription.completed" => Self::Completed,
            "subscription.paused" => Self::Paused,
            "subscription.resumed" => Self::Resumed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticated => "subscription.authenticated",
            Self::Activated => "subscription.activated",
            Self::Charged => "subscription.charged",
            Self::Pending => "subscription.pending",
            Self::Halted => "subscription.halted",
            Self::Cancelled => "subscription.cancelled",
            Self::Completed => "subscription.completed",
            Self::Paused => "subscription.paused",
            Self::Resumed => "subscription.resumed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for WebhookEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
