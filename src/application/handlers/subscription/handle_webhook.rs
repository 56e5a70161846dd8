//! HandleWebhookHandler - applies gateway webhook events to local records.
//!
//! The endpoint is shared by all tenants, so the tenant is found from the
//! payload before trust is established: only the subscription id is read
//! from the unverified body, the owning config supplies the webhook secret,
//! and the full event is decoded only after the signature checks out.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, ValidationError};
use crate::domain::subscription::{
    reconcile, routing_subscription_id, GatewayEvent, ReconcileOutcome, SubscriptionError,
    VerifiedBody,
};
use crate::domain::tenant::TenantConfigError;
use crate::ports::SubscriptionRepository;

use crate::application::handlers::tenant_config::TenantConfigStore;

#[derive(Debug, Clone)]
pub struct HandleWebhookCommand {
    /// Raw request body, exactly as received.
    pub body: Vec<u8>,
    pub signature: String,
}

pub struct HandleWebhookHandler {
    configs: Arc<TenantConfigStore>,
    repository: Arc<dyn SubscriptionRepository>,
}

impl HandleWebhookHandler {
    pub fn new(configs: Arc<TenantConfigStore>, repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self {
            configs,
            repository,
        }
    }

    pub async fn handle(&self, cmd: HandleWebhookCommand) -> Result<ReconcileOutcome, SubscriptionError> {
        if cmd.signature.trim().is_empty() {
            return Err(ValidationError::empty_field("X-Razorpay-Signature").into());
        }

        let gateway_id = routing_subscription_id(&cmd.body)?;

        let mut subscription = self
            .repository
            .find_by_gateway_id(&gateway_id)
            .await?
            .ok_or_else(|| SubscriptionError::gateway_id_not_found(&gateway_id))?;

        // Inactive configs still authenticate events for their existing subscriptions.
        let config = self
            .configs
            .find_by_id(&subscription.tenant_config_id)
            .await?
            .ok_or(TenantConfigError::NotFound(subscription.tenant_config_id))?;

        let verified = VerifiedBody::verify(&cmd.body, &cmd.signature, config.credentials.webhook_secret())
            .map_err(|e| {
                tracing::warn!(
                    gateway_subscription_id = %gateway_id,
                    tenant = %config.tenant,
                    "Webhook signature rejected"
                );
                e
            })?;
        let event = GatewayEvent::decode(verified)?;
        let kind = event.kind();

        let outcome = reconcile(&mut subscription, &event, Timestamp::now());

        if outcome.is_out_of_order() {
            tracing::warn!(
                subscription_id = %subscription.id,
                event = kind.as_str(),
                outcome = ?outcome,
                "Gateway moved subscription along an unexpected transition"
            );
        }

        match outcome {
            ReconcileOutcome::Updated { .. } => {
                self.repository.update(&subscription).await?;
            }
            ReconcileOutcome::StatusChanged { to, .. } => {
                self.repository
                    .update_status(&subscription.id, to, subscription.updated_at)
                    .await?;
            }
            ReconcileOutcome::Ignored(reason) => {
                tracing::debug!(
                    subscription_id = %subscription.id,
                    event = kind.as_str(),
                    reason = reason.as_str(),
                    "Webhook event ignored"
                );
                return Ok(outcome);
            }
        }

        tracing::info!(
            subscription_id = %subscription.id,
            event = kind.as_str(),
            status = %subscription.status,
            "Webhook event applied"
        );

        Ok(outcome)
    }
}
