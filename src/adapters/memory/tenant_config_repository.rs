//! In-memory tenant config repository for tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PageRequest, TenantConfigId, Timestamp};
use crate::domain::tenant::TenantKey;
use crate::ports::{StoredTenantConfig, TenantConfigRepository};

#[derive(Debug, Clone)]
struct Row {
    config: StoredTenantConfig,
    deleted_at: Option<Timestamp>,
}

impl Row {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    fn is_tenant(&self, tenant: &TenantKey) -> bool {
        self.config.app_name == tenant.app_name() && self.config.environment == tenant.environment()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTenantConfigRepository {
    rows: Arc<RwLock<HashMap<TenantConfigId, Row>>>,
}

impl InMemoryTenantConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored record, deleted ones included.
    pub async fn stored(&self, id: &TenantConfigId) -> Option<StoredTenantConfig> {
        self.rows.read().await.get(id).map(|row| row.config.clone())
    }
}

#[async_trait]
impl TenantConfigRepository for InMemoryTenantConfigRepository {
    async fn insert(&self, config: &StoredTenantConfig) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;
        let duplicate = rows.values().any(|row| {
            row.is_live()
                && row.config.app_name == config.app_name
                && row.config.environment == config.environment
        });
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::TenantConfigExists,
                "app_name and environment combination already exists",
            ));
        }

        rows.insert(
            config.id,
            Row {
                config: config.clone(),
                deleted_at: None,
            },
        );
        Ok(())
    }

    async fn update(&self, config: &StoredTenantConfig) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&config.id) {
            Some(row) if row.is_live() => {
                row.config.encrypted_key_id = config.encrypted_key_id.clone();
                row.config.encrypted_key_secret = config.encrypted_key_secret.clone();
                row.config.encrypted_webhook_secret = config.encrypted_webhook_secret.clone();
                row.config.is_active = config.is_active;
                row.config.metadata = config.metadata.clone();
                row.config.updated_at = config.updated_at;
                Ok(())
            }
            _ => Err(DomainError::new(
                ErrorCode::TenantConfigNotFound,
                format!("Config not found: {}", config.id),
            )),
        }
    }

    async fn find_by_id(&self, id: &TenantConfigId) -> Result<Option<StoredTenantConfig>, DomainError> {
        let rows = self.rows.read().await;
        Ok(rows
            .get(id)
            .filter(|row| row.is_live())
            .map(|row| row.config.clone()))
    }

    async fn find_by_tenant(&self, tenant: &TenantKey) -> Result<Option<StoredTenantConfig>, DomainError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|row| row.is_live() && row.is_tenant(tenant))
            .map(|row| row.config.clone()))
    }

    async fn list(
        &self,
        page: PageRequest,
        active_only: bool,
    ) -> Result<(Vec<StoredTenantConfig>, u64), DomainError> {
        let rows = self.rows.read().await;
        let mut matching: Vec<StoredTenantConfig> = rows
            .values()
            .filter(|row| row.is_live() && (!active_only || row.config.is_active))
            .map(|row| row.config.clone())
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });

        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((data, total))
    }

    async fn soft_delete(&self, id: &TenantConfigId, deleted_at: Timestamp) -> Result<bool, DomainError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(id) {
            Some(row) if row.is_live() => {
                row.deleted_at = Some(deleted_at);
                row.config.is_active = false;
                row.config.updated_at = deleted_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
