//! GetSubscriptionHandler - single subscription lookups.

use std::sync::Arc;

use crate::domain::foundation::{SubscriptionId, ValidationError};
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub enum GetSubscriptionQuery {
    ById(SubscriptionId),
    ByGatewayId(String),
    /// Most recent subscription for a phone number within an app.
    LatestByContact { phone: String, app_name: String },
}

pub struct GetSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl GetSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetSubscriptionQuery) -> Result<Subscription, SubscriptionError> {
        match query {
            GetSubscriptionQuery::ById(id) => self
                .repository
                .find_by_id(&id)
                .await?
                .ok_or_else(|| SubscriptionError::not_found(id)),
            GetSubscriptionQuery::ByGatewayId(gateway_id) => {
                if gateway_id.trim().is_empty() {
                    return Err(ValidationError::empty_field("razorpay_subscription_id").into());
                }
                self.repository
                    .find_by_gateway_id(&gateway_id)
                    .await?
                    .ok_or_else(|| SubscriptionError::gateway_id_not_found(gateway_id))
            }
            GetSubscriptionQuery::LatestByContact { phone, app_name } => {
                if phone.trim().is_empty() {
                    return Err(ValidationError::empty_field("phone").into());
                }
                if app_name.trim().is_empty() {
                    return Err(ValidationError::empty_field("app_name").into());
                }
                self.repository
                    .find_latest_by_contact(&phone, &app_name)
                    .await?
                    .ok_or(SubscriptionError::NotFoundForContact { phone, app_name })
            }
        }
    }
}
