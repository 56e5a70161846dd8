//! In-memory repository implementations.

mod subscription_repository;
mod tenant_config_repository;

pub use subscription_repository::InMemorySubscriptionRepository;
pub use tenant_config_repository::InMemoryTenantConfigRepository;
