//! GetTenantConfigHandler - looks up a tenant config by id or by tenant.

use std::sync::Arc;

use crate::domain::foundation::TenantConfigId;
use crate::domain::tenant::{GatewayEnvironment, TenantConfig, TenantConfigError, TenantKey};

use super::TenantConfigStore;

#[derive(Debug, Clone)]
pub enum GetTenantConfigQuery {
    ById(TenantConfigId),
    /// Active config for an app; environment defaults to `test`.
    ByTenant {
        app_name: String,
        environment: Option<String>,
    },
}

pub struct GetTenantConfigHandler {
    store: Arc<TenantConfigStore>,
}

impl GetTenantConfigHandler {
    pub fn new(store: Arc<TenantConfigStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetTenantConfigQuery) -> Result<TenantConfig, TenantConfigError> {
        match query {
            GetTenantConfigQuery::ById(id) => self
                .store
                .find_by_id(&id)
                .await?
                .ok_or(TenantConfigError::NotFound(id)),
            GetTenantConfigQuery::ByTenant {
                app_name,
                environment,
            } => {
                let environment = match environment.as_deref().map(str::trim) {
                    Some(env) if !env.is_empty() => env.parse()?,
                    _ => GatewayEnvironment::default(),
                };
                let tenant = TenantKey::new(app_name, environment)?;
                self.store
                    .find_active_by_tenant(&tenant)
                    .await?
                    .ok_or(TenantConfigError::NotFoundForTenant(tenant))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::tenant_config::store::test_support::{store, tenant_config};

    #[tokio::test]
    async fn by_tenant_defaults_to_test_environment() {
        let (store, _) = store();
        let config = tenant_config("astro", GatewayEnvironment::Test);
        store.create(&config).await.unwrap();
        let handler = GetTenantConfigHandler::new(store);

        let found = handler
            .handle(GetTenantConfigQuery::ByTenant {
                app_name: "astro".to_string(),
                environment: None,
            })
            .await
            .unwrap();

        assert_eq!(found.id, config.id);
    }

    #[tokio::test]
    async fn by_tenant_skips_other_environment() {
        let (store, _) = store();
        store
            .create(&tenant_config("astro", GatewayEnvironment::Test))
            .await
            .unwrap();
        let handler = GetTenantConfigHandler::new(store);

        let err = handler
            .handle(GetTenantConfigQuery::ByTenant {
                app_name: "astro".to_string(),
                environment: Some("live".to_string()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TenantConfigError::NotFoundForTenant(_)));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (store, _) = store();
        let handler = GetTenantConfigHandler::new(store);
        let id = TenantConfigId::new();

        let err = handler.handle(GetTenantConfigQuery::ById(id)).await.unwrap_err();

        assert_eq!(err, TenantConfigError::NotFound(id));
    }
}
