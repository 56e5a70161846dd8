//! Tenant config repository port.
//!
//! Works on the encrypted record form; encryption and decryption happen in
//! the config store above it, so implementations never see plaintext
//! credentials.

use crate::domain::foundation::{DomainError, PageRequest, TenantConfigId, Timestamp};
use crate::domain::tenant::{GatewayEnvironment, TenantKey};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A tenant config as stored: credential fields hold ciphertext.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTenantConfig {
    pub id: TenantConfigId,
    pub app_name: String,
    pub environment: GatewayEnvironment,
    pub encrypted_key_id: String,
    pub encrypted_key_secret: String,
    pub encrypted_webhook_secret: String,
    pub is_active: bool,
    pub metadata: Map<String, Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[async_trait]
pub trait TenantConfigRepository: Send + Sync {
    /// Save a new config.
    ///
    /// # Errors
    ///
    /// - `TenantConfigExists` if a live config for the same (app, environment) exists
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, config: &StoredTenantConfig) -> Result<(), DomainError>;

    /// Replace credentials, activation flag and metadata.
    ///
    /// # Errors
    ///
    /// - `TenantConfigNotFound` if the config doesn't exist or was deleted
    async fn update(&self, config: &StoredTenantConfig) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &TenantConfigId) -> Result<Option<StoredTenantConfig>, DomainError>;

    /// Config for a tenant regardless of its activation flag.
    async fn find_by_tenant(&self, tenant: &TenantKey) -> Result<Option<StoredTenantConfig>, DomainError>;

    /// Newest first, with the total number of matching rows.
    async fn list(
        &self,
        page: PageRequest,
        active_only: bool,
    ) -> Result<(Vec<StoredTenantConfig>, u64), DomainError>;

    /// Marks the config deleted. Returns false if nothing was deleted.
    async fn soft_delete(&self, id: &TenantConfigId, deleted_at: Timestamp) -> Result<bool, DomainError>;
}
