//! Ports - contracts between the application core and infrastructure.

mod payment_gateway;
mod secret_codec;
mod subscription_repository;
mod tenant_config_repository;

pub use payment_gateway::{
    Addon, AddonItem, CancelOptions, CreateSubscriptionRequest, GatewayConnector, GatewayError,
    GatewayErrorCode, GatewayPlan, GatewayResolver, GatewaySubscription, PaymentGateway, PlanItem,
};
pub use secret_codec::{CipherError, SecretCodec};
pub use subscription_repository::{SubscriptionFilter, SubscriptionRepository};
pub use tenant_config_repository::{StoredTenantConfig, TenantConfigRepository};
