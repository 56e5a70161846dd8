//! Application handlers.
//!
//! One command or query handler per operation. Handlers hold their
//! collaborators as `Arc<dyn Port>` and never touch infrastructure directly.

pub mod subscription;
pub mod tenant_config;

pub use subscription::{
    AuthenticationStatus, CancelSubscriptionCommand, CancelSubscriptionHandler,
    CheckAuthenticationHandler, CheckAuthenticationQuery, CreateCheckoutCommand,
    CreateCheckoutHandler, GetSubscriptionHandler, GetSubscriptionQuery, HandleWebhookCommand,
    HandleWebhookHandler, ListSubscriptionsHandler, ListSubscriptionsQuery, VerifyPaymentCommand,
    VerifyPaymentHandler,
};
pub use tenant_config::{
    CreateTenantConfigCommand, CreateTenantConfigHandler, DeleteTenantConfigCommand,
    DeleteTenantConfigHandler, GetTenantConfigHandler, GetTenantConfigQuery,
    ListTenantConfigsHandler, ListTenantConfigsQuery, TenantConfigStore,
    UpdateTenantConfigCommand, UpdateTenantConfigHandler,
};
