//! Subscription module - recurring mandates mirrored from the payment gateway.
//!
//! # Module Structure
//!
//! - `status` - Closed status enum and its state machine
//! - `aggregate` - The Subscription entity
//! - `metadata` - Notes plus the idempotent authentication marker
//! - `checkout` - Charge schedule rules for new checkouts
//! - `signature` - HMAC-SHA256 verification
//! - `gateway_event` - Two-phase webhook parsing
//! - `reconcile` - Event effects on the local record
//! - `errors` - Subscription error taxonomy

mod aggregate;
mod checkout;
mod errors;
mod gateway_event;
mod metadata;
mod reconcile;
mod signature;
mod status;

pub use aggregate::{NewSubscription, Subscription, SubscriptionRecord, VerificationOutcome};
#[cfg(test)]
pub(crate) use aggregate::test_support;
pub use checkout::{
    checkout_link_expiry, effective_quantity, effective_total_count, normalize_plan_id,
    AuthorizationCharge, BillingPeriod, ChargeSchedule, ScheduleDecision,
    AUTHORIZATION_ADDON_NAME, CHECKOUT_LINK_TTL_DAYS, DEFAULT_AUTHORIZATION_AMOUNT,
    DEFAULT_CURRENCY, DEFAULT_FIRST_CHARGE_DELAY_DAYS, DEFAULT_TOTAL_COUNT,
    MIN_START_OFFSET_HOURS,
};
pub use errors::SubscriptionError;
pub use gateway_event::{
    routing_subscription_id, EntityWrapper, EventPayload, GatewayEvent, PaymentEntity,
    SubscriptionEntity, VerifiedBody, WebhookEventKind,
};
pub use metadata::{SubscriptionMetadata, AUTHENTICATED_AT_KEY, AUTHENTICATED_KEY};
pub use reconcile::{reconcile, IgnoreReason, ReconcileOutcome};
pub use signature::{
    compute_signature, payment_message, verify_payment_signature, verify_signature,
    verify_webhook_signature,
};
pub use status::SubscriptionStatus;
