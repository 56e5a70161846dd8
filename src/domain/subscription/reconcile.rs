//! Webhook reconciliation rules.
//!
//! Applies a verified gateway event to the local record. The gateway is
//! authoritative, so status effects apply even when they fall outside the
//! local state machine; callers can detect that with
//! [`ReconcileOutcome::is_out_of_order`]. The one exception is a late
//! `authenticated` event for a cancelled subscription, which is dropped.

use crate::domain::foundation::{StateMachine, Timestamp};

use super::{GatewayEvent, Subscription, SubscriptionStatus, WebhookEventKind};

/// Why an event produced no change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownEvent,
    AuthenticatedAfterCancel,
    NoChange,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::UnknownEvent => "unknown_event",
            IgnoreReason::AuthenticatedAfterCancel => "authenticated_after_cancel",
            IgnoreReason::NoChange => "no_change",
        }
    }
}

/// What the caller must persist after reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Non-status fields changed; save the whole record.
    Updated {
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    },
    /// Only the status changed.
    StatusChanged {
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    },
    Ignored(IgnoreReason),
}

impl ReconcileOutcome {
    /// True when the status moved along an edge the local state machine does not expect.
    pub fn is_out_of_order(&self) -> bool {
        match self {
            ReconcileOutcome::Updated { from, to } | ReconcileOutcome::StatusChanged { from, to } => {
                from != to && !from.can_transition_to(to)
            }
            ReconcileOutcome::Ignored(_) => false,
        }
    }
}

/// Applies `event` to `subscription`.
pub fn reconcile(
    subscription: &mut Subscription,
    event: &GatewayEvent,
    now: Timestamp,
) -> ReconcileOutcome {
    let entity = event.subscription();
    let before = subscription.clone();

    match event.kind() {
        WebhookEventKind::Unknown => return ReconcileOutcome::Ignored(IgnoreReason::UnknownEvent),
        WebhookEventKind::Authenticated => {
            if subscription.status == SubscriptionStatus::Cancelled {
                return ReconcileOutcome::Ignored(IgnoreReason::AuthenticatedAfterCancel);
            }
            if let Some(customer_id) = entity.customer_id.as_ref().filter(|c| !c.is_empty()) {
                subscription.gateway_customer_id = Some(customer_id.clone());
            }
            if let Some(start) = entity.start_time() {
                subscription.start_at = Some(start);
            }
            if let Some(charge) = entity.charge_time() {
                subscription.next_charge_at = Some(charge);
            }
            subscription.metadata.mark_authenticated(now);
            subscription.status = entity
                .status
                .as_deref()
                .and_then(SubscriptionStatus::from_gateway)
                .unwrap_or(SubscriptionStatus::Authenticated);
        }
        WebhookEventKind::Activated => {
            if let Some(start) = entity.start_time() {
                subscription.start_at = Some(start);
            }
        }
        WebhookEventKind::Charged => {
            if let Some(charge) = entity.charge_time() {
                subscription.next_charge_at = Some(charge);
            }
            if matches!(
                subscription.status,
                SubscriptionStatus::Created | SubscriptionStatus::Authenticated
            ) {
                subscription.status = SubscriptionStatus::Active;
            }
        }
        WebhookEventKind::Pending => subscription.status = SubscriptionStatus::Created,
        WebhookEventKind::Halted => subscription.status = SubscriptionStatus::Expired,
        WebhookEventKind::Cancelled => {
            subscription.status = SubscriptionStatus::Cancelled;
            if let Some(end) = entity.end_time() {
                subscription.end_at = Some(end);
            }
        }
        WebhookEventKind::Completed => {
            subscription.status = SubscriptionStatus::Completed;
            if let Some(end) = entity.ended_time() {
                subscription.end_at = Some(end);
            }
        }
        WebhookEventKind::Paused => subscription.status = SubscriptionStatus::Paused,
        WebhookEventKind::Resumed => subscription.status = SubscriptionStatus::Active,
    }

    if *subscription == before {
        return ReconcileOutcome::Ignored(IgnoreReason::NoChange);
    }

    let from = before.status;
    let to = subscription.status;
    let mut status_only = before;
    status_only.status = to;
    let only_status_changed = status_only == *subscription;

    subscription.touch(now);

    if only_status_changed {
        ReconcileOutcome::StatusChanged { from, to }
    } else {
        ReconcileOutcome::Updated { from, to }
    }
}
