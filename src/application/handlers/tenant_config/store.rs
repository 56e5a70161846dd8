//! TenantConfigStore - encrypting facade over the tenant config repository.
//!
//! Credentials are sealed with the process-wide [`SecretCodec`] before they
//! reach the repository and opened again on every read. A record whose
//! ciphertext cannot be opened is unusable and reported as corrupt.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::{ErrorCode, Page, PageRequest, TenantConfigId, Timestamp};
use crate::domain::tenant::{GatewayCredentials, TenantConfig, TenantConfigError, TenantKey};
use crate::ports::{SecretCodec, StoredTenantConfig, TenantConfigRepository};

pub struct TenantConfigStore {
    repository: Arc<dyn TenantConfigRepository>,
    codec: Arc<dyn SecretCodec>,
}

impl TenantConfigStore {
    pub fn new(repository: Arc<dyn TenantConfigRepository>, codec: Arc<dyn SecretCodec>) -> Self {
        Self { repository, codec }
    }

    /// Stores a new config.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if a live config for the same tenant exists
    pub async fn create(&self, config: &TenantConfig) -> Result<(), TenantConfigError> {
        if self.repository.find_by_tenant(&config.tenant).await?.is_some() {
            return Err(TenantConfigError::AlreadyExists(config.tenant.clone()));
        }

        let stored = self.seal(config)?;
        self.repository.insert(&stored).await.map_err(|e| {
            if e.code == ErrorCode::TenantConfigExists {
                TenantConfigError::AlreadyExists(config.tenant.clone())
            } else {
                e.into()
            }
        })
    }

    /// Config by id, active or not.
    pub async fn find_by_id(&self, id: &TenantConfigId) -> Result<Option<TenantConfig>, TenantConfigError> {
        self.repository
            .find_by_id(id)
            .await?
            .map(|stored| self.open(stored))
            .transpose()
    }

    /// Active config for a tenant. Inactive configs are treated as absent.
    pub async fn find_active_by_tenant(
        &self,
        tenant: &TenantKey,
    ) -> Result<Option<TenantConfig>, TenantConfigError> {
        match self.repository.find_by_tenant(tenant).await? {
            Some(stored) if stored.is_active => self.open(stored).map(Some),
            _ => Ok(None),
        }
    }

    pub async fn list(
        &self,
        request: PageRequest,
        active_only: bool,
    ) -> Result<Page<TenantConfig>, TenantConfigError> {
        let (rows, total) = self.repository.list(request, active_only).await?;
        let configs = rows
            .into_iter()
            .map(|stored| self.open(stored))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(configs, request, total))
    }

    pub async fn update(&self, config: &TenantConfig) -> Result<(), TenantConfigError> {
        let stored = self.seal(config)?;
        self.repository.update(&stored).await.map_err(|e| {
            if e.code == ErrorCode::TenantConfigNotFound {
                TenantConfigError::NotFound(config.id)
            } else {
                e.into()
            }
        })
    }

    /// Soft-deletes a config. Returns false when there was nothing to delete.
    pub async fn soft_delete(&self, id: &TenantConfigId, at: Timestamp) -> Result<bool, TenantConfigError> {
        Ok(self.repository.soft_delete(id, at).await?)
    }

    fn seal(&self, config: &TenantConfig) -> Result<StoredTenantConfig, TenantConfigError> {
        let credentials = &config.credentials;
        Ok(StoredTenantConfig {
            id: config.id,
            app_name: config.tenant.app_name().to_string(),
            environment: config.tenant.environment(),
            encrypted_key_id: self.codec.encrypt(credentials.key_id().expose_secret())?,
            encrypted_key_secret: self.codec.encrypt(credentials.key_secret().expose_secret())?,
            encrypted_webhook_secret: self
                .codec
                .encrypt(credentials.webhook_secret().expose_secret())?,
            is_active: config.is_active,
            metadata: config.metadata.clone(),
            created_at: config.created_at,
            updated_at: config.updated_at,
        })
    }

    fn open(&self, stored: StoredTenantConfig) -> Result<TenantConfig, TenantConfigError> {
        let key_id = self.codec.decrypt(&stored.encrypted_key_id)?;
        let key_secret = self.codec.decrypt(&stored.encrypted_key_secret)?;
        let webhook_secret = self.codec.decrypt(&stored.encrypted_webhook_secret)?;

        let credentials = GatewayCredentials::new(
            SecretString::new(key_id),
            SecretString::new(key_secret),
            SecretString::new(webhook_secret),
        )
        .map_err(|_| {
            TenantConfigError::CorruptCiphertext(format!("config {} has empty credentials", stored.id))
        })?;
        let tenant = TenantKey::new(stored.app_name, stored.environment)?;

        Ok(TenantConfig {
            id: stored.id,
            tenant,
            credentials,
            is_active: stored.is_active,
            metadata: stored.metadata,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }
}
