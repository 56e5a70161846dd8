//! Tenant config handlers.

mod create_config;
mod delete_config;
mod get_config;
mod list_configs;
pub(crate) mod store;
mod update_config;

pub use create_config::{CreateTenantConfigCommand, CreateTenantConfigHandler};
pub use delete_config::{DeleteTenantConfigCommand, DeleteTenantConfigHandler};
pub use get_config::{GetTenantConfigHandler, GetTenantConfigQuery};
pub use list_configs::{ListTenantConfigsHandler, ListTenantConfigsQuery};
pub use store::TenantConfigStore;
pub use update_config::{UpdateTenantConfigCommand, UpdateTenantConfigHandler};
