//! ListTenantConfigsHandler - paginated tenant config listing.

use std::sync::Arc;

use crate::domain::foundation::{Page, PageRequest};
use crate::domain::tenant::{TenantConfig, TenantConfigError};

use super::TenantConfigStore;

#[derive(Debug, Clone, Default)]
pub struct ListTenantConfigsQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub active_only: bool,
}

pub struct ListTenantConfigsHandler {
    store: Arc<TenantConfigStore>,
}

impl ListTenantConfigsHandler {
    pub fn new(store: Arc<TenantConfigStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: ListTenantConfigsQuery) -> Result<Page<TenantConfig>, TenantConfigError> {
        let request = PageRequest::normalize(query.page, query.page_size);
        self.store.list(request, query.active_only).await
    }
}
