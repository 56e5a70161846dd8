//! In-memory subscription repository for tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PageRequest, SubscriptionId, Timestamp};
use crate::domain::subscription::{Subscription, SubscriptionStatus};
use crate::ports::{SubscriptionFilter, SubscriptionRepository};

#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: Arc<RwLock<HashMap<SubscriptionId, Subscription>>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, deleted ones included.
    pub async fn len(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn not_found(id: &SubscriptionId) -> DomainError {
    DomainError::new(
        ErrorCode::SubscriptionNotFound,
        format!("Subscription not found: {}", id),
    )
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn insert(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut subscriptions = self.subscriptions.write().await;

        if subscriptions.contains_key(&subscription.id) {
            return Err(DomainError::database("duplicate subscription id"));
        }
        if let Some(gateway_id) = subscription.gateway_subscription_id() {
            let taken = subscriptions
                .values()
                .any(|s| s.gateway_subscription_id() == Some(gateway_id));
            if taken {
                return Err(DomainError::database(format!(
                    "duplicate gateway subscription id: {}",
                    gateway_id
                )));
            }
        }

        subscriptions.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut subscriptions = self.subscriptions.write().await;
        match subscriptions.get_mut(&subscription.id) {
            Some(stored) if !stored.is_deleted() => {
                *stored = subscription.clone();
                Ok(())
            }
            _ => Err(not_found(&subscription.id)),
        }
    }

    async fn update_status(
        &self,
        id: &SubscriptionId,
        status: SubscriptionStatus,
        updated_at: Timestamp,
    ) -> Result<(), DomainError> {
        let mut subscriptions = self.subscriptions.write().await;
        match subscriptions.get_mut(id) {
            Some(stored) if !stored.is_deleted() => {
                stored.status = status;
                stored.updated_at = updated_at;
                Ok(())
            }
            _ => Err(not_found(id)),
        }
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions.get(id).filter(|s| !s.is_deleted()).cloned())
    }

    async fn find_by_gateway_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .values()
            .find(|s| {
                !s.is_deleted() && s.gateway_subscription_id() == Some(gateway_subscription_id)
            })
            .cloned())
    }

    async fn find_latest_by_contact(
        &self,
        phone: &str,
        app_name: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .values()
            .filter(|s| !s.is_deleted() && s.phone == phone && s.app_name == app_name)
            .max_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
            })
            .cloned())
    }

    async fn has_authenticated_by_contact(
        &self,
        phone: &str,
        app_name: &str,
    ) -> Result<bool, DomainError> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions.values().any(|s| {
            !s.is_deleted()
                && s.phone == phone
                && s.app_name == app_name
                && s.metadata.is_authenticated()
        }))
    }

    async fn list(
        &self,
        filter: &SubscriptionFilter,
        page: PageRequest,
    ) -> Result<(Vec<Subscription>, u64), DomainError> {
        let subscriptions = self.subscriptions.read().await;
        let mut matching: Vec<Subscription> = subscriptions
            .values()
            .filter(|s| !s.is_deleted() && filter.matches(s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });

        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((data, total))
    }
}
