//! Subscription repository port.
//!
//! Persists Subscription aggregates. Implementations must enforce
//! uniqueness of the gateway subscription id and hide soft-deleted rows
//! from every read.

use crate::domain::foundation::{
    DomainError, PageRequest, SubscriptionId, TenantConfigId, Timestamp,
};
use crate::domain::subscription::{Subscription, SubscriptionStatus};
use async_trait::async_trait;

/// Optional narrowing for subscription listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub app_name: Option<String>,
    pub tenant_config_id: Option<TenantConfigId>,
}

impl SubscriptionFilter {
    pub fn matches(&self, subscription: &Subscription) -> bool {
        self.app_name
            .as_deref()
            .map_or(true, |app| subscription.app_name == app)
            && self
                .tenant_config_id
                .map_or(true, |id| subscription.tenant_config_id == id)
    }
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Save a new subscription.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure, including a duplicate gateway id
    async fn insert(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Replace the stored record.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the record doesn't exist
    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Change only the status column.
    async fn update_status(
        &self,
        id: &SubscriptionId,
        status: SubscriptionStatus,
        updated_at: Timestamp,
    ) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError>;

    async fn find_by_gateway_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Most recently created subscription for a contact within an app.
    async fn find_latest_by_contact(
        &self,
        phone: &str,
        app_name: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Whether any subscription for the contact carries the authentication marker.
    async fn has_authenticated_by_contact(
        &self,
        phone: &str,
        app_name: &str,
    ) -> Result<bool, DomainError>;

    /// Newest first, with the total number of matching rows.
    async fn list(
        &self,
        filter: &SubscriptionFilter,
        page: PageRequest,
    ) -> Result<(Vec<Subscription>, u64), DomainError>;
}
