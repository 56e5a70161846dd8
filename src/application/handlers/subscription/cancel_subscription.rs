//! CancelSubscriptionHandler - cancels at the gateway, then locally.

use std::sync::Arc;

use crate::domain::foundation::{SubscriptionId, Timestamp};
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::domain::tenant::TenantConfigError;
use crate::ports::{CancelOptions, GatewayResolver, SubscriptionRepository};

use super::gateway_failure;
use crate::application::handlers::tenant_config::TenantConfigStore;

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub id: SubscriptionId,
}

pub struct CancelSubscriptionHandler {
    configs: Arc<TenantConfigStore>,
    gateways: Arc<dyn GatewayResolver>,
    repository: Arc<dyn SubscriptionRepository>,
}

impl CancelSubscriptionHandler {
    pub fn new(
        configs: Arc<TenantConfigStore>,
        gateways: Arc<dyn GatewayResolver>,
        repository: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            configs,
            gateways,
            repository,
        }
    }

    pub async fn handle(&self, cmd: CancelSubscriptionCommand) -> Result<Subscription, SubscriptionError> {
        let mut subscription = self
            .repository
            .find_by_id(&cmd.id)
            .await?
            .ok_or_else(|| SubscriptionError::not_found(cmd.id))?;

        let config = self
            .configs
            .find_by_id(&subscription.tenant_config_id)
            .await?
            .ok_or(TenantConfigError::NotFound(subscription.tenant_config_id))?;

        let gateway_id = subscription
            .gateway_subscription_id()
            .map(str::to_string)
            .ok_or_else(|| {
                SubscriptionError::validation(
                    "razorpay_subscription_id",
                    "subscription has no gateway subscription",
                )
            })?;

        let gateway = self
            .gateways
            .resolve(&config)
            .map_err(|e| gateway_failure("connect to gateway", e))?;
        gateway
            .cancel_subscription(&gateway_id, CancelOptions::immediately())
            .await
            .map_err(|e| gateway_failure(format!("cancel subscription {}", gateway_id), e))?;

        subscription.mark_cancelled(Timestamp::now());
        self.repository.update(&subscription).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            gateway_subscription_id = %gateway_id,
            "Subscription cancelled"
        );

        Ok(subscription)
    }
}
