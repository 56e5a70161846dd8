//! Per-tenant cache of gateway client handles.
//!
//! Handles are created on first use and kept for the life of the process.
//! Concurrent first requests for one tenant build exactly one handle.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::tenant::{GatewayCredentials, TenantConfig, TenantKey};
use crate::ports::{GatewayConnector, GatewayError, GatewayResolver, PaymentGateway};

pub struct GatewayClientCache {
    connector: Arc<dyn GatewayConnector>,
    clients: RwLock<HashMap<TenantKey, Arc<dyn PaymentGateway>>>,
}

impl GatewayClientCache {
    pub fn new(connector: Arc<dyn GatewayConnector>) -> Self {
        Self {
            connector,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached handle for `tenant`, building it from
    /// `credentials` if absent.
    ///
    /// Credentials are only read on a miss; a cached handle keeps the
    /// credentials it was built with.
    pub fn get_or_create(
        &self,
        tenant: &TenantKey,
        credentials: &GatewayCredentials,
    ) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
        {
            let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(client) = clients.get(tenant) {
                return Ok(Arc::clone(client));
            }
        }

        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        // Another request may have built it while we waited for the write lock.
        if let Some(client) = clients.get(tenant) {
            return Ok(Arc::clone(client));
        }

        let client = self.connector.connect(credentials)?;
        clients.insert(tenant.clone(), Arc::clone(&client));
        tracing::info!(tenant = %tenant, "Created payment gateway client");
        Ok(client)
    }

    pub fn len(&self) -> usize {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GatewayResolver for GatewayClientCache {
    fn resolve(&self, config: &TenantConfig) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
        self.get_or_create(&config.tenant, &config.credentials)
    }
}
