//! UpdateTenantConfigHandler - partial update of credentials and flags.

use std::sync::Arc;

use crate::domain::foundation::{TenantConfigId, Timestamp};
use crate::domain::tenant::{TenantConfig, TenantConfigChanges, TenantConfigError};

use super::TenantConfigStore;

#[derive(Debug, Clone)]
pub struct UpdateTenantConfigCommand {
    pub id: TenantConfigId,
    pub changes: TenantConfigChanges,
}

pub struct UpdateTenantConfigHandler {
    store: Arc<TenantConfigStore>,
}

impl UpdateTenantConfigHandler {
    pub fn new(store: Arc<TenantConfigStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: UpdateTenantConfigCommand) -> Result<TenantConfig, TenantConfigError> {
        let mut config = self
            .store
            .find_by_id(&cmd.id)
            .await?
            .ok_or(TenantConfigError::NotFound(cmd.id))?;

        config.apply(cmd.changes, Timestamp::now())?;
        self.store.update(&config).await?;

        tracing::info!(config_id = %config.id, tenant = %config.tenant, "Updated tenant gateway config");

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::tenant_config::store::test_support::{store, tenant_config};
    use crate::domain::tenant::GatewayEnvironment;
    use secrecy::{ExposeSecret, SecretString};

    #[tokio::test]
    async fn merges_only_supplied_fields() {
        let (store, _) = store();
        let config = tenant_config("astro", GatewayEnvironment::Test);
        store.create(&config).await.unwrap();
        let handler = UpdateTenantConfigHandler::new(store.clone());

        handler
            .handle(UpdateTenantConfigCommand {
                id: config.id,
                changes: TenantConfigChanges {
                    webhook_secret: Some(SecretString::new("rotated".to_string())),
                    is_active: Some(false),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        let stored = store.find_by_id(&config.id).await.unwrap().unwrap();
        assert!(!stored.is_active);
        assert_eq!(stored.credentials.webhook_secret().expose_secret(), "rotated");
        assert_eq!(
            stored.credentials.key_secret().expose_secret(),
            "key_secret_value"
        );
        assert_eq!(stored.tenant, config.tenant);
    }

    #[tokio::test]
    async fn missing_config_is_not_found() {
        let (store, _) = store();
        let handler = UpdateTenantConfigHandler::new(store);
        let id = TenantConfigId::new();

        let err = handler
            .handle(UpdateTenantConfigCommand {
                id,
                changes: TenantConfigChanges::default(),
            })
            .await
            .unwrap_err();

        assert_eq!(err, TenantConfigError::NotFound(id));
    }
}
