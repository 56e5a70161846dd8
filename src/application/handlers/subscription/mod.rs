//! Subscription handlers.
//!
//! Each handler resolves the tenant config that owns the subscription,
//! obtains that tenant's gateway handle through the resolver and works on
//! the local record.

mod cancel_subscription;
mod check_authentication;
mod create_checkout;
mod get_subscription;
mod handle_webhook;
mod list_subscriptions;
mod verify_payment;

pub use cancel_subscription::{CancelSubscriptionCommand, CancelSubscriptionHandler};
pub use check_authentication::{
    AuthenticationStatus, CheckAuthenticationHandler, CheckAuthenticationQuery,
};
pub use create_checkout::{CreateCheckoutCommand, CreateCheckoutHandler};
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery};
pub use handle_webhook::{HandleWebhookCommand, HandleWebhookHandler};
pub use list_subscriptions::{ListSubscriptionsHandler, ListSubscriptionsQuery};
pub use verify_payment::{VerifyPaymentCommand, VerifyPaymentHandler};

use crate::domain::subscription::SubscriptionError;
use crate::ports::GatewayError;

/// Maps a gateway failure onto the subscription error taxonomy.
///
/// `context` names the attempted operation and must not carry credentials.
pub(crate) fn gateway_failure(context: impl Into<String>, err: GatewayError) -> SubscriptionError {
    let context = context.into();
    if err.is_client_fault() {
        SubscriptionError::GatewayRejected {
            context,
            reason: err.message,
        }
    } else {
        SubscriptionError::GatewayUnavailable {
            context,
            reason: err.message,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Wiring shared by handler tests: one tenant, a mock gateway and
    //! in-memory repositories.

    use std::sync::Arc;

    use secrecy::SecretString;

    use crate::adapters::gateway_cache::GatewayClientCache;
    use crate::adapters::memory::InMemorySubscriptionRepository;
    use crate::adapters::razorpay::{MockConnector, MockGateway};
    use crate::application::handlers::tenant_config::store::test_support as config_support;
    use crate::application::handlers::tenant_config::TenantConfigStore;
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::subscription::{
        NewSubscription, Subscription, SubscriptionMetadata, SubscriptionStatus,
    };
    use crate::domain::tenant::{GatewayEnvironment, TenantConfig};
    use crate::ports::GatewayResolver;
    use uuid::Uuid;

    pub const KEY_SECRET: &str = "key_secret_value";
    pub const WEBHOOK_SECRET: &str = "webhook_secret_value";

    pub struct Fixture {
        pub configs: Arc<TenantConfigStore>,
        pub config: TenantConfig,
        pub gateway: MockGateway,
        pub connector: Arc<MockConnector>,
        pub resolver: Arc<dyn GatewayResolver>,
        pub subscriptions: InMemorySubscriptionRepository,
    }

    impl Fixture {
        pub async fn new() -> Self {
            let (configs, _) = config_support::store();
            let config = config_support::tenant_config("astro", GatewayEnvironment::Test);
            configs.create(&config).await.unwrap();

            let gateway = MockGateway::new();
            gateway.add_simple_plan("plan_monthly", 49_900, "monthly");
            let connector = Arc::new(MockConnector::new(gateway.clone()));
            let resolver: Arc<dyn GatewayResolver> =
                Arc::new(GatewayClientCache::new(connector.clone()));

            Self {
                configs,
                config,
                gateway,
                connector,
                resolver,
                subscriptions: InMemorySubscriptionRepository::new(),
            }
        }

        pub fn repository(&self) -> Arc<InMemorySubscriptionRepository> {
            Arc::new(self.subscriptions.clone())
        }

        /// Stores a subscription owned by the fixture tenant.
        pub async fn seed(&self, gateway_id: &str, status: SubscriptionStatus) -> Subscription {
            use crate::ports::SubscriptionRepository;

            let subscription = Subscription::create(
                NewSubscription {
                    tenant_config_id: self.config.id,
                    user_id: UserId::from_uuid(Uuid::new_v4()),
                    app_name: "astro".to_string(),
                    phone: "9999999999".to_string(),
                    email: "user@example.com".to_string(),
                    gateway_subscription_id: gateway_id.to_string(),
                    gateway_customer_id: None,
                    gateway_plan_id: "plan_monthly".to_string(),
                    status,
                    amount: 49_900,
                    currency: "INR".to_string(),
                    frequency: "monthly".to_string(),
                    total_count: 120,
                    start_at: None,
                    short_url: "https://rzp.io/i/abc".to_string(),
                    metadata: SubscriptionMetadata::new(),
                },
                Timestamp::now(),
            );
            self.subscriptions.insert(&subscription).await.unwrap();
            subscription
        }
    }

    pub fn secret(value: &str) -> SecretString {
        SecretString::new(value.to_string())
    }
}
