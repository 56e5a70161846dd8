//! HTTP adapter for tenant config endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{TenantConfigApiError, TenantConfigAppState};
pub use routes::tenant_config_routes;
