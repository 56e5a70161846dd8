//! VerifyPaymentHandler - checks the checkout callback signature.
//!
//! The signature is `HMAC-SHA256(key_secret, "{payment_id}|{subscription_id}")`
//! with the key secret of the tenant that owns the subscription. After a
//! valid signature the gateway must still confirm the subscription exists.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, ValidationError};
use crate::domain::subscription::{
    verify_payment_signature, Subscription, SubscriptionError, VerificationOutcome,
};
use crate::domain::tenant::TenantConfigError;
use crate::ports::{GatewayResolver, SubscriptionRepository};

use super::gateway_failure;
use crate::application::handlers::tenant_config::TenantConfigStore;

#[derive(Debug, Clone)]
pub struct VerifyPaymentCommand {
    pub payment_id: String,
    pub gateway_subscription_id: String,
    pub signature: String,
}

pub struct VerifyPaymentHandler {
    configs: Arc<TenantConfigStore>,
    gateways: Arc<dyn GatewayResolver>,
    repository: Arc<dyn SubscriptionRepository>,
}

impl VerifyPaymentHandler {
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

    pub async fn handle(&self, cmd: VerifyPaymentCommand) -> Result<Subscription, SubscriptionError> {
        require("razorpay_payment_id", &cmd.payment_id)?;
        require("razorpay_subscription_id", &cmd.gateway_subscription_id)?;
        require("razorpay_signature", &cmd.signature)?;

        let mut subscription = self
            .repository
            .find_by_gateway_id(&cmd.gateway_subscription_id)
            .await?
            .ok_or_else(|| SubscriptionError::gateway_id_not_found(&cmd.gateway_subscription_id))?;

        let config = self
            .configs
            .find_by_id(&subscription.tenant_config_id)
            .await?
            .ok_or(TenantConfigError::NotFound(subscription.tenant_config_id))?;

        if !verify_payment_signature(
            &cmd.payment_id,
            &cmd.gateway_subscription_id,
            &cmd.signature,
            config.credentials.key_secret(),
        ) {
            tracing::warn!(
                gateway_subscription_id = %cmd.gateway_subscription_id,
                payment_id = %cmd.payment_id,
                "Payment signature rejected"
            );
            return Err(SubscriptionError::InvalidPaymentSignature);
        }

        let gateway = self
            .gateways
            .resolve(&config)
            .map_err(|e| gateway_failure("connect to gateway", e))?;
        gateway
            .fetch_subscription(&cmd.gateway_subscription_id)
            .await
            .map_err(|e| {
                gateway_failure(
                    format!("fetch subscription {}", cmd.gateway_subscription_id),
                    e,
                )
            })?;

        let outcome = subscription.record_payment_verification(Timestamp::now());
        if outcome.changed() {
            self.repository.update(&subscription).await?;
        }

        match outcome {
            VerificationOutcome::AlreadyEnded => tracing::info!(
                subscription_id = %subscription.id,
                status = %subscription.status,
                "Payment verified for ended subscription; record left unchanged"
            ),
            _ => tracing::info!(
                subscription_id = %subscription.id,
                status = %subscription.status,
                "Payment verified"
            ),
        }

        Ok(subscription)
    }
}

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{Fixture, KEY_SECRET};
    use super::*;
    use crate::domain::subscription::{compute_signature, payment_message, SubscriptionStatus};
    use crate::ports::{CreateSubscriptionRequest, GatewayError, PaymentGateway};

    fn handler(fixture: &Fixture) -> VerifyPaymentHandler {
        VerifyPaymentHandler::new(
            fixture.configs.clone(),
            fixture.resolver.clone(),
            fixture.repository(),
        )
    }

    fn signed(gateway_id: &str, secret: &str) -> VerifyPaymentCommand {
        let message = payment_message("pay_123", gateway_id);
        VerifyPaymentCommand {
            payment_id: "pay_123".to_string(),
            gateway_subscription_id: gateway_id.to_string(),
            signature: compute_signature(secret.as_bytes(), message.as_bytes()),
        }
    }

    async fn seed_at_gateway(fixture: &Fixture, status: SubscriptionStatus) -> String {
        let created = fixture
            .gateway
            .create_subscription(&CreateSubscriptionRequest {
                plan_id: "plan_monthly".to_string(),
                quantity: 1,
                customer_notify: false,
                total_count: 12,
                expire_by: 0,
                start_at: 0,
                addons: vec![],
                notes: None,
            })
            .await
            .unwrap();
        fixture.seed(&created.id, status).await;
        created.id
    }

    #[tokio::test]
    async fn valid_signature_promotes_to_authenticated() {
        let fixture = Fixture::new().await;
        let gateway_id = seed_at_gateway(&fixture, SubscriptionStatus::Created).await;

        let subscription = handler(&fixture)
            .handle(signed(&gateway_id, KEY_SECRET))
            .await
            .unwrap();

        assert_eq!(subscription.status, SubscriptionStatus::Authenticated);
        assert!(subscription.metadata.is_authenticated());
        let stored = fixture
            .subscriptions
            .find_by_gateway_id(&gateway_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Authenticated);
    }

    #[tokio::test]
    async fn wrong_secret_is_unauthorized() {
        let fixture = Fixture::new().await;
        let gateway_id = seed_at_gateway(&fixture, SubscriptionStatus::Created).await;

        let err = handler(&fixture)
            .handle(signed(&gateway_id, "not_the_secret"))
            .await
            .unwrap_err();

        assert_eq!(err, SubscriptionError::InvalidPaymentSignature);
        assert!(!fixture.gateway.was_called("fetch_subscription"));
    }

    #[tokio::test]
    async fn unknown_subscription_is_not_found() {
        let fixture = Fixture::new().await;

        let err = handler(&fixture)
            .handle(signed("sub_unknown", KEY_SECRET))
            .await
            .unwrap_err();

        assert_eq!(err, SubscriptionError::gateway_id_not_found("sub_unknown"));
    }

    #[tokio::test]
    async fn verification_does_not_regress_active() {
        let fixture = Fixture::new().await;
        let gateway_id = seed_at_gateway(&fixture, SubscriptionStatus::Active).await;

        let subscription = handler(&fixture)
            .handle(signed(&gateway_id, KEY_SECRET))
            .await
            .unwrap();

        assert_eq!(subscription.status, SubscriptionStatus::Active);
        assert!(subscription.metadata.is_authenticated());
    }

    #[tokio::test]
    async fn second_verification_keeps_first_timestamp() {
        let fixture = Fixture::new().await;
        let gateway_id = seed_at_gateway(&fixture, SubscriptionStatus::Created).await;
        let handler = handler(&fixture);

        let first = handler.handle(signed(&gateway_id, KEY_SECRET)).await.unwrap();
        let second = handler.handle(signed(&gateway_id, KEY_SECRET)).await.unwrap();

        assert_eq!(
            first.metadata.authenticated_at(),
            second.metadata.authenticated_at()
        );
        assert_eq!(first.updated_at, second.updated_at);
    }

    #[tokio::test]
    async fn gateway_must_confirm_subscription() {
        let fixture = Fixture::new().await;
        let gateway_id = seed_at_gateway(&fixture, SubscriptionStatus::Created).await;
        fixture
            .gateway
            .set_method_error("fetch_subscription", GatewayError::network("timeout"));

        let err = handler(&fixture)
            .handle(signed(&gateway_id, KEY_SECRET))
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::GatewayUnavailable { .. }));
        let stored = fixture
            .subscriptions
            .find_by_gateway_id(&gateway_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Created);
    }

    #[tokio::test]
    async fn missing_fields_are_validation_errors() {
        let fixture = Fixture::new().await;
        let mut cmd = signed("sub_x", KEY_SECRET);
        cmd.signature = String::new();

        let err = handler(&fixture).handle(cmd).await.unwrap_err();

        assert!(matches!(
            err,
            SubscriptionError::ValidationFailed { ref field, .. } if field == "razorpay_signature"
        ));
    }
}
