//! HTTP adapters - REST API implementations.
//!
//! Each module has its own state, handlers and routes; `router` mounts
//! them under `/api/v1`.

pub mod error;
pub mod router;
pub mod subscription;
pub mod tenant_config;

pub use error::ErrorResponse;
pub use router::api_router;
pub use subscription::SubscriptionAppState;
pub use tenant_config::TenantConfigAppState;
