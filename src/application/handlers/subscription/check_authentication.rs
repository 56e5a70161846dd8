//! CheckAuthenticationHandler - has this contact ever authorized a mandate?

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::ValidationError;
use crate::domain::subscription::SubscriptionError;
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct CheckAuthenticationQuery {
    pub phone: String,
    pub app_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticationStatus {
    pub has_authenticated: bool,
    pub phone: String,
}

pub struct CheckAuthenticationHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl CheckAuthenticationHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: CheckAuthenticationQuery) -> Result<AuthenticationStatus, SubscriptionError> {
        if query.phone.trim().is_empty() {
            return Err(ValidationError::empty_field("phone").into());
        }
        if query.app_name.trim().is_empty() {
            return Err(ValidationError::empty_field("app_name").into());
        }

        let has_authenticated = self
            .repository
            .has_authenticated_by_contact(&query.phone, &query.app_name)
            .await?;

        Ok(AuthenticationStatus {
            has_authenticated,
            phone: query.phone,
        })
    }
}
