//! Tenant module - per-application gateway credentials.

mod config;
mod errors;

pub use config::{
    GatewayCredentials, GatewayEnvironment, TenantConfig, TenantConfigChanges, TenantKey,
    MAX_APP_NAME_LEN,
};
pub use errors::TenantConfigError;
