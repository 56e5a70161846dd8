//! Subscription aggregate entity.
//!
//! # Invariants
//!
//! - `gateway_subscription_id` is set at construction and never reassigned
//! - `short_url` is immutable after creation
//! - Money is stored as integer minor units (paise)
//! - Records are soft-deleted only

use crate::domain::foundation::{
    StateMachine, SubscriptionId, TenantConfigId, Timestamp, UserId,
};

use super::{SubscriptionMetadata, SubscriptionStatus};

/// Local mirror of a gateway subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: SubscriptionId,

    /// Tenant config whose credentials created this subscription.
    pub tenant_config_id: TenantConfigId,

    pub user_id: UserId,
    pub app_name: String,
    pub phone: String,
    pub email: String,

    gateway_subscription_id: Option<String>,
    pub gateway_customer_id: Option<String>,
    pub gateway_plan_id: String,

    pub status: SubscriptionStatus,

    /// Per-charge amount in minor units.
    pub amount: i64,
    pub currency: String,
    pub max_amount: Option<i64>,
    pub frequency: String,
    pub total_count: u32,

    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub next_charge_at: Option<Timestamp>,

    short_url: String,
    pub metadata: SubscriptionMetadata,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Everything known about a subscription right after the gateway created it.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub tenant_config_id: TenantConfigId,
    pub user_id: UserId,
    pub app_name: String,
    pub phone: String,
    pub email: String,
    pub gateway_subscription_id: String,
    pub gateway_customer_id: Option<String>,
    pub gateway_plan_id: String,
    pub status: SubscriptionStatus,
    pub amount: i64,
    pub currency: String,
    pub frequency: String,
    pub total_count: u32,
    pub start_at: Option<Timestamp>,
    pub short_url: String,
    pub metadata: SubscriptionMetadata,
}

/// Stored column values, used by repositories to rebuild the aggregate.
#[derive(Debug, Clone)]
pub struct SubscriptionRecord {
    pub id: SubscriptionId,
    pub tenant_config_id: TenantConfigId,
    pub user_id: UserId,
    pub app_name: String,
    pub phone: String,
    pub email: String,
    pub gateway_subscription_id: Option<String>,
    pub gateway_customer_id: Option<String>,
    pub gateway_plan_id: String,
    pub status: SubscriptionStatus,
    pub amount: i64,
    pub currency: String,
    pub max_amount: Option<i64>,
    pub frequency: String,
    pub total_count: u32,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub next_charge_at: Option<Timestamp>,
    pub short_url: String,
    pub metadata: SubscriptionMetadata,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Result of applying a verified checkout callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Status moved from `created` to `authenticated`.
    Promoted,
    /// Status was already at or past authentication; only the marker may have changed.
    MarkerOnly { changed: bool },
    /// Subscription already ended; nothing changed.
    AlreadyEnded,
}

impl VerificationOutcome {
    pub fn changed(&self) -> bool {
        match self {
            VerificationOutcome::Promoted => true,
            VerificationOutcome::MarkerOnly { changed } => *changed,
            VerificationOutcome::AlreadyEnded => false,
        }
    }
}

impl Subscription {
    /// Builds a fresh record from a successful gateway creation.
    pub fn create(new: NewSubscription, now: Timestamp) -> Self {
        Self {
            id: SubscriptionId::new(),
            tenant_config_id: new.tenant_config_id,
            user_id: new.user_id,
            app_name: new.app_name,
            phone: new.phone,
            email: new.email,
            gateway_subscription_id: Some(new.gateway_subscription_id),
            gateway_customer_id: new.gateway_customer_id,
            gateway_plan_id: new.gateway_plan_id,
            status: new.status,
            amount: new.amount,
            currency: new.currency,
            max_amount: None,
            frequency: new.frequency,
            total_count: new.total_count,
            start_at: new.start_at,
            end_at: None,
            next_charge_at: None,
            short_url: new.short_url,
            metadata: new.metadata,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Rebuilds the aggregate from storage.
    pub fn reconstitute(record: SubscriptionRecord) -> Self {
        Self {
            id: record.id,
            tenant_config_id: record.tenant_config_id,
            user_id: record.user_id,
            app_name: record.app_name,
            phone: record.phone,
            email: record.email,
            gateway_subscription_id: record.gateway_subscription_id,
            gateway_customer_id: record.gateway_customer_id,
            gateway_plan_id: record.gateway_plan_id,
            status: record.status,
            amount: record.amount,
            currency: record.currency,
            max_amount: record.max_amount,
            frequency: record.frequency,
            total_count: record.total_count,
            start_at: record.start_at,
            end_at: record.end_at,
            next_charge_at: record.next_charge_at,
            short_url: record.short_url,
            metadata: record.metadata,
            created_at: record.created_at,
            updated_at: record.updated_at,
            deleted_at: record.deleted_at,
        }
    }

    pub fn gateway_subscription_id(&self) -> Option<&str> {
        self.gateway_subscription_id.as_deref()
    }

    pub fn short_url(&self) -> &str {
        &self.short_url
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Applies a verified checkout callback.
    ///
    /// Promotes `created` to `authenticated`; never regresses a later status
    /// and never touches an ended subscription.
    pub fn record_payment_verification(&mut self, now: Timestamp) -> VerificationOutcome {
        if self.status.is_terminal() {
            return VerificationOutcome::AlreadyEnded;
        }

        let marker_changed = self.metadata.mark_authenticated(now);
        let outcome = if self
            .status
            .can_transition_to(&SubscriptionStatus::Authenticated)
        {
            self.status = SubscriptionStatus::Authenticated;
            VerificationOutcome::Promoted
        } else {
            VerificationOutcome::MarkerOnly {
                changed: marker_changed,
            }
        };

        if outcome.changed() {
            self.touch(now);
        }
        outcome
    }

    /// Marks the subscription cancelled after the gateway confirmed it.
    pub fn mark_cancelled(&mut self, now: Timestamp) {
        self.status = SubscriptionStatus::Cancelled;
        self.touch(now);
    }

    pub(crate) fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }
}

impl From<Subscription> for SubscriptionRecord {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            tenant_config_id: s.tenant_config_id,
            user_id: s.user_id,
            app_name: s.app_name,
            phone: s.phone,
            email: s.email,
            gateway_subscription_id: s.gateway_subscription_id,
            gateway_customer_id: s.gateway_customer_id,
            gateway_plan_id: s.gateway_plan_id,
            status: s.status,
            amount: s.amount,
            currency: s.currency,
            max_amount: s.max_amount,
            frequency: s.frequency,
            total_count: s.total_count,
            start_at: s.start_at,
            end_at: s.end_at,
            next_charge_at: s.next_charge_at,
            short_url: s.short_url,
            metadata: s.metadata,
            created_at: s.created_at,
            updated_at: s.updated_at,
            deleted_at: s.deleted_at,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::new_subscription;
    use super::*;

    #[test]
    fn create_assigns_gateway_id_and_fresh_internal_id() {
        let a = new_subscription(SubscriptionStatus::Created);
        let b = new_subscription(SubscriptionStatus::Created);

        assert_ne!(a.id, b.id);
        assert_eq!(a.gateway_subscription_id(), Some("sub_test_1"));
        assert_eq!(a.short_url(), "https://rzp.io/i/abc");
        assert!(!a.is_deleted());
    }

    #[test]
    fn verification_promotes_created() {
        let mut sub = new_subscription(SubscriptionStatus::Created);
        let now = sub.created_at.plus_hours(1).unwrap();

        let outcome = sub.record_payment_verification(now);

        assert_eq!(outcome, VerificationOutcome::Promoted);
        assert_eq!(sub.status, SubscriptionStatus::Authenticated);
        assert!(sub.metadata.is_authenticated());
        assert_eq!(sub.updated_at, now);
    }

    #[test]
    fn verification_is_idempotent_once_authenticated() {
        let mut sub = new_subscription(SubscriptionStatus::Created);
        let first = sub.created_at.plus_hours(1).unwrap();
        sub.record_payment_verification(first);
        let stamped = sub.metadata.authenticated_at().map(str::to_string);

        let outcome = sub.record_payment_verification(first.plus_hours(2).unwrap());

        assert_eq!(outcome, VerificationOutcome::MarkerOnly { changed: false });
        assert_eq!(sub.metadata.authenticated_at().map(str::to_string), stamped);
        assert_eq!(sub.updated_at, first);
    }

    #[test]
    fn verification_never_regresses_active() {
        let mut sub = new_subscription(SubscriptionStatus::Active);
        let outcome = sub.record_payment_verification(Timestamp::now());

        assert_eq!(outcome, VerificationOutcome::MarkerOnly { changed: true });
        assert_eq!(sub.status, SubscriptionStatus::Active);
    }

    #[test]
    fn verification_leaves_cancelled_untouched() {
        let mut sub = new_subscription(SubscriptionStatus::Cancelled);
        let outcome = sub.record_payment_verification(Timestamp::now());

        assert_eq!(outcome, VerificationOutcome::AlreadyEnded);
        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
        assert!(!sub.metadata.is_authenticated());
    }

    #[test]
    fn mark_cancelled_sets_status() {
        let mut sub = new_subscription(SubscriptionStatus::Active);
        sub.mark_cancelled(Timestamp::now());
        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
    }
}
