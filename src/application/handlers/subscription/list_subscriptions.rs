//! ListSubscriptionsHandler - paginated subscription listing.

use std::sync::Arc;

use crate::domain::foundation::{Page, PageRequest, TenantConfigId};
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::{SubscriptionFilter, SubscriptionRepository};

#[derive(Debug, Clone, Default)]
pub struct ListSubscriptionsQuery {
    pub app_name: Option<String>,
    pub config_id: Option<TenantConfigId>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

pub struct ListSubscriptionsHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl ListSubscriptionsHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: ListSubscriptionsQuery) -> Result<Page<Subscription>, SubscriptionError> {
        let request = PageRequest::normalize(query.page, query.page_size);
        let filter = SubscriptionFilter {
            app_name: query.app_name.filter(|a| !a.trim().is_empty()),
            tenant_config_id: query.config_id,
        };

        let (rows, total) = self.repository.list(&filter, request).await?;
        Ok(Page::new(rows, request, total))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;
    use crate::domain::subscription::SubscriptionStatus;

    #[tokio::test]
    async fn pages_through_subscriptions() {
        let fixture = Fixture::new().await;
        for n in 0..3 {
            fixture.seed(&format!("sub_{n}"), SubscriptionStatus::Created).await;
        }
        let handler = ListSubscriptionsHandler::new(fixture.repository());

        let page = handler
            .handle(ListSubscriptionsQuery {
                page: Some(1),
                page_size: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total, 3);
        assert_eq!(page.next_page, Some(2));
    }

    #[tokio::test]
    async fn filters_by_app_and_config() {
        let fixture = Fixture::new().await;
        fixture.seed("sub_1", SubscriptionStatus::Created).await;
        let handler = ListSubscriptionsHandler::new(fixture.repository());

        let other_app = handler
            .handle(ListSubscriptionsQuery {
                app_name: Some("other".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let by_config = handler
            .handle(ListSubscriptionsQuery {
                config_id: Some(fixture.config.id),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(other_app.total, 0);
        assert!(other_app.data.is_empty());
        assert_eq!(by_config.total, 1);
    }
}
