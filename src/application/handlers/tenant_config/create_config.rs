//! CreateTenantConfigHandler - registers gateway credentials for a tenant.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::{Map, Value};

use crate::domain::foundation::Timestamp;
use crate::domain::tenant::{GatewayCredentials, GatewayEnvironment, TenantConfig, TenantConfigError, TenantKey};

use super::TenantConfigStore;

#[derive(Debug, Clone)]
pub struct CreateTenantConfigCommand {
    pub app_name: String,
    pub environment: String,
    pub key_id: SecretString,
    pub key_secret: SecretString,
    pub webhook_secret: SecretString,
    pub is_active: Option<bool>,
    pub metadata: Option<Map<String, Value>>,
}

pub struct CreateTenantConfigHandler {
    store: Arc<TenantConfigStore>,
}

impl CreateTenantConfigHandler {
    pub fn new(store: Arc<TenantConfigStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: CreateTenantConfigCommand) -> Result<TenantConfig, TenantConfigError> {
        let environment: GatewayEnvironment = cmd.environment.trim().parse()?;
        let tenant = TenantKey::new(cmd.app_name, environment)?;
        let credentials = GatewayCredentials::new(cmd.key_id, cmd.key_secret, cmd.webhook_secret)?;

        let config = TenantConfig::new(
            tenant,
            credentials,
            cmd.is_active.unwrap_or(true),
            cmd.metadata.unwrap_or_default(),
            Timestamp::now(),
        );

        self.store.create(&config).await?;

        tracing::info!(
            config_id = %config.id,
            tenant = %config.tenant,
            "Created tenant gateway config"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::tenant_config::store::test_support::store;

    fn command(app: &str, environment: &str) -> CreateTenantConfigCommand {
        CreateTenantConfigCommand {
            app_name: app.to_string(),
            environment: environment.to_string(),
            key_id: SecretString::new("rzp_test_key".to_string()),
            key_secret: SecretString::new("secret".to_string()),
            webhook_secret: SecretString::new("whsec".to_string()),
            is_active: None,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn creates_active_config_by_default() {
        let (store, _) = store();
        let handler = CreateTenantConfigHandler::new(store.clone());

        let config = handler.handle(command("astro", "live")).await.unwrap();

        assert!(config.is_active);
        assert_eq!(config.tenant.environment(), GatewayEnvironment::Live);
        assert!(store.find_by_id(&config.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn second_config_for_same_tenant_conflicts() {
        let (store, _) = store();
        let handler = CreateTenantConfigHandler::new(store);
        handler.handle(command("astro", "test")).await.unwrap();

        let mut other = command("astro", "test");
        other.key_secret = SecretString::new("different".to_string());
        let err = handler.handle(other).await.unwrap_err();

        assert!(matches!(err, TenantConfigError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn unknown_environment_is_rejected() {
        let (store, _) = store();
        let handler = CreateTenantConfigHandler::new(store);

        let err = handler.handle(command("astro", "prod")).await.unwrap_err();

        assert!(matches!(
            err,
            TenantConfigError::ValidationFailed { ref field, .. } if field == "environment"
        ));
    }

    #[tokio::test]
    async fn blank_secret_is_rejected() {
        let (store, _) = store();
        let handler = CreateTenantConfigHandler::new(store);
        let mut cmd = command("astro", "test");
        cmd.webhook_secret = SecretString::new("  ".to_string());

        let err = handler.handle(cmd).await.unwrap_err();

        assert!(matches!(
            err,
            TenantConfigError::ValidationFailed { ref field, .. } if field == "razorpay_webhook_secret"
        ));
    }
}
