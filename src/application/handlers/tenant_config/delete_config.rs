//! DeleteTenantConfigHandler - soft-deletes a tenant config.

use std::sync::Arc;

use crate::domain::foundation::{TenantConfigId, Timestamp};
use crate::domain::tenant::TenantConfigError;

use super::TenantConfigStore;

#[derive(Debug, Clone)]
pub struct DeleteTenantConfigCommand {
    pub id: TenantConfigId,
}

pub struct DeleteTenantConfigHandler {
    store: Arc<TenantConfigStore>,
}

impl DeleteTenantConfigHandler {
    pub fn new(store: Arc<TenantConfigStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: DeleteTenantConfigCommand) -> Result<(), TenantConfigError> {
        if !self.store.soft_delete(&cmd.id, Timestamp::now()).await? {
            return Err(TenantConfigError::NotFound(cmd.id));
        }
        tracing::info!(config_id = %cmd.id, "Deleted tenant gateway config");
        Ok(())
    }
}
