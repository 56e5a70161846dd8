//! CreateCheckoutHandler - creates a gateway subscription and its local record.
//!
//! Flow:
//! 1. Validate contact fields, the plan id, counts and the charge schedule
//! 2. Resolve the tenant config (explicit id, or app name in the server's environment)
//! 3. Fix the authorization charge and first-charge delay (from the plan if asked)
//! 4. Create the subscription at the gateway
//! 5. Fetch the plan for amount, currency and period
//! 6. Save the local record
//!
//! A failure after step 4 leaves a gateway subscription with no local
//! record. That case is logged as an orphan and reported distinctly.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::foundation::{TenantConfigId, Timestamp, UserId, ValidationError};
use crate::domain::subscription::{
    checkout_link_expiry, effective_quantity, effective_total_count, normalize_plan_id,
    ChargeSchedule, NewSubscription, ScheduleDecision, Subscription, SubscriptionError,
    SubscriptionMetadata, SubscriptionStatus, AUTHORIZATION_ADDON_NAME, DEFAULT_CURRENCY,
};
use crate::domain::tenant::{
    GatewayEnvironment, TenantConfig, TenantConfigError, TenantKey, MAX_APP_NAME_LEN,
};
use crate::ports::{
    Addon, AddonItem, CreateSubscriptionRequest, GatewayPlan, GatewayResolver, PaymentGateway,
    SubscriptionRepository,
};

use super::gateway_failure;
use crate::application::handlers::tenant_config::TenantConfigStore;

const MIN_PHONE_LEN: usize = 10;
const MAX_PHONE_LEN: usize = 15;
const MAX_EMAIL_LEN: usize = 255;

#[derive(Debug, Clone)]
pub struct CreateCheckoutCommand {
    pub user_id: UserId,
    /// Explicit tenant config; otherwise `app_name` selects the config.
    pub config_id: Option<TenantConfigId>,
    pub app_name: String,
    pub phone: String,
    pub email: String,
    pub plan_id: String,
    pub total_count: Option<i64>,
    pub start_at: Option<Timestamp>,
    pub quantity: Option<i64>,
    pub notes: Option<Map<String, Value>>,
    /// Whole currency units.
    pub initial_charge_amount: Option<i64>,
    pub first_charge_delay_days: Option<i64>,
}

pub struct CreateCheckoutHandler {
    configs: Arc<TenantConfigStore>,
    gateways: Arc<dyn GatewayResolver>,
    repository: Arc<dyn SubscriptionRepository>,
    environment: GatewayEnvironment,
}

impl CreateCheckoutHandler {
    /// `environment` is the gateway environment app-name lookups resolve against.
    pub fn new(
        configs: Arc<TenantConfigStore>,
        gateways: Arc<dyn GatewayResolver>,
        repository: Arc<dyn SubscriptionRepository>,
        environment: GatewayEnvironment,
    ) -> Self {
        Self {
            configs,
            gateways,
            repository,
            environment,
        }
    }

    pub async fn handle(&self, cmd: CreateCheckoutCommand) -> Result<Subscription, SubscriptionError> {
        let app_name = validate_app_name(&cmd.app_name)?;
        let phone = validate_phone(&cmd.phone)?;
        let email = validate_email(&cmd.email)?;
        let plan_id = normalize_plan_id(&cmd.plan_id)?;
        let total_count = effective_total_count(cmd.total_count)?;
        let quantity = effective_quantity(cmd.quantity)?;
        let decision = ChargeSchedule::decide(cmd.initial_charge_amount, cmd.first_charge_delay_days)?;

        let config = self.resolve_config(cmd.config_id, &app_name).await?;
        config.ensure_active()?;
        let gateway = self
            .gateways
            .resolve(&config)
            .map_err(|e| gateway_failure("connect to gateway", e))?;

        let mut plan: Option<GatewayPlan> = None;
        let schedule = match decision {
            ScheduleDecision::Resolved(schedule) => schedule,
            ScheduleDecision::FromPlan => {
                let fetched = gateway
                    .fetch_plan(&plan_id)
                    .await
                    .map_err(|e| gateway_failure(format!("fetch plan {}", plan_id), e))?;
                let schedule = ChargeSchedule::from_plan(fetched.item.amount, &fetched.billing_period());
                plan = Some(fetched);
                schedule
            }
        };

        let now = Timestamp::now();
        let start_at = schedule.start_at(now, cmd.start_at)?;
        let expire_by = checkout_link_expiry(now)?;
        let addons = schedule
            .authorization
            .addon_amount()
            .map(|amount| {
                vec![Addon {
                    item: AddonItem {
                        name: AUTHORIZATION_ADDON_NAME.to_string(),
                        amount,
                        currency: DEFAULT_CURRENCY.to_string(),
                    },
                }]
            })
            .unwrap_or_default();

        let request = CreateSubscriptionRequest {
            plan_id: plan_id.clone(),
            quantity,
            customer_notify: false,
            total_count,
            expire_by: expire_by.as_unix_secs(),
            start_at: start_at.as_unix_secs(),
            addons,
            notes: cmd.notes.clone(),
        };

        let created = gateway
            .create_subscription(&request)
            .await
            .map_err(|e| gateway_failure(format!("create subscription for plan {}", plan_id), e))?;

        tracing::info!(
            gateway_subscription_id = %created.id,
            plan_id = %plan_id,
            tenant = %config.tenant,
            authorization_amount = schedule.authorization.amount(),
            first_charge_delay_days = schedule.first_charge_delay_days,
            "Created gateway subscription"
        );

        // From here on a failure orphans the gateway subscription.
        let plan = match plan {
            Some(plan) if plan.id == created.plan_id => plan,
            _ => self
                .fetch_created_plan(gateway.as_ref(), &created.plan_id, &created.id)
                .await?,
        };

        let subscription = Subscription::create(
            NewSubscription {
                tenant_config_id: config.id,
                user_id: cmd.user_id,
                app_name,
                phone,
                email,
                gateway_subscription_id: created.id.clone(),
                gateway_customer_id: created.customer_id.filter(|c| !c.is_empty()),
                gateway_plan_id: created.plan_id.clone(),
                status: SubscriptionStatus::from_gateway(&created.status)
                    .unwrap_or(SubscriptionStatus::Created),
                amount: plan.item.amount,
                currency: plan.item.currency.clone(),
                frequency: plan.period.clone(),
                total_count,
                start_at: Some(start_at),
                short_url: created.short_url.clone().unwrap_or_default(),
                metadata: SubscriptionMetadata::from_notes(cmd.notes),
            },
            Timestamp::now(),
        );

        if let Err(e) = self.repository.insert(&subscription).await {
            tracing::error!(
                gateway_subscription_id = %created.id,
                tenant = %config.tenant,
                error = %e,
                "Orphaned gateway subscription: local save failed"
            );
            return Err(SubscriptionError::orphaned(created.id, e.message));
        }

        tracing::info!(
            subscription_id = %subscription.id,
            gateway_subscription_id = %created.id,
            "Checkout created"
        );

        Ok(subscription)
    }

    async fn resolve_config(
        &self,
        config_id: Option<TenantConfigId>,
        app_name: &str,
    ) -> Result<TenantConfig, SubscriptionError> {
        match config_id {
            Some(id) => Ok(self
                .configs
                .find_by_id(&id)
                .await?
                .ok_or(TenantConfigError::NotFound(id))?),
            None => {
                let tenant = TenantKey::new(app_name, self.environment)?;
                Ok(self
                    .configs
                    .find_active_by_tenant(&tenant)
                    .await?
                    .ok_or(TenantConfigError::NotFoundForTenant(tenant))?)
            }
        }
    }

    async fn fetch_created_plan(
        &self,
        gateway: &dyn PaymentGateway,
        plan_id: &str,
        gateway_subscription_id: &str,
    ) -> Result<GatewayPlan, SubscriptionError> {
        gateway.fetch_plan(plan_id).await.map_err(|e| {
            tracing::error!(
                gateway_subscription_id = %gateway_subscription_id,
                plan_id = %plan_id,
                error = %e,
                "Orphaned gateway subscription: plan lookup failed"
            );
            SubscriptionError::orphaned(gateway_subscription_id, e.message)
        })
    }
}

fn validate_app_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("app_name"));
    }
    if trimmed.chars().count() > MAX_APP_NAME_LEN {
        return Err(ValidationError::too_long(
            "app_name",
            MAX_APP_NAME_LEN,
            trimmed.chars().count(),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_phone(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("phone"));
    }
    if trimmed.len() < MIN_PHONE_LEN || trimmed.len() > MAX_PHONE_LEN {
        return Err(ValidationError::invalid_format(
            "phone",
            format!("must be {} to {} characters", MIN_PHONE_LEN, MAX_PHONE_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_email(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("email"));
    }
    if trimmed.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::too_long("email", MAX_EMAIL_LEN, trimmed.len()));
    }
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(ValidationError::invalid_format("email", "must be a valid email address"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;
    use crate::domain::foundation::{DomainError, PageRequest, SubscriptionId};
    use crate::ports::{GatewayError, SubscriptionFilter};
    use async_trait::async_trait;
    use uuid::Uuid;

    fn command() -> CreateCheckoutCommand {
        CreateCheckoutCommand {
            user_id: UserId::from_uuid(Uuid::new_v4()),
            config_id: None,
            app_name: "astro".to_string(),
            phone: "9999999999".to_string(),
            email: "user@example.com".to_string(),
            plan_id: "plan_monthly".to_string(),
            total_count: None,
            start_at: None,
            quantity: None,
            notes: None,
            initial_charge_amount: None,
            first_charge_delay_days: None,
        }
    }

    fn handler(fixture: &Fixture) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(
            fixture.configs.clone(),
            fixture.resolver.clone(),
            fixture.repository(),
            GatewayEnvironment::Test,
        )
    }

    #[tokio::test]
    async fn default_checkout_attaches_one_rupee_addon() {
        let fixture = Fixture::new().await;

        let subscription = handler(&fixture).handle(command()).await.unwrap();

        let request = fixture.gateway.last_created_request().unwrap();
        assert_eq!(request.addons.len(), 1);
        assert_eq!(request.addons[0].item.amount, 100);
        assert_eq!(request.addons[0].item.name, "Initial Charge");
        assert_eq!(request.total_count, 120);
        assert_eq!(request.quantity, 1);
        assert!(!request.customer_notify);
        assert_eq!(request.expire_by - request.start_at, 6 * 86_400);

        assert_eq!(subscription.status, SubscriptionStatus::Created);
        assert_eq!(subscription.gateway_subscription_id(), Some("sub_mock_1"));
        assert_eq!(subscription.amount, 49_900);
        assert_eq!(subscription.frequency, "monthly");
        assert_eq!(subscription.tenant_config_id, fixture.config.id);
    }

    #[tokio::test]
    async fn both_zero_uses_plan_period_and_omits_addon() {
        let fixture = Fixture::new().await;
        let mut cmd = command();
        cmd.initial_charge_amount = Some(0);
        cmd.first_charge_delay_days = Some(0);

        let before = Timestamp::now().as_unix_secs();
        handler(&fixture).handle(cmd).await.unwrap();

        let request = fixture.gateway.last_created_request().unwrap();
        assert!(request.addons.is_empty());
        let delay = request.start_at - before;
        assert!((30 * 86_400..30 * 86_400 + 5).contains(&delay));
        // The plan fetched for the schedule is reused for the record.
        assert_eq!(fixture.gateway.call_count("fetch_plan"), 1);
    }

    #[tokio::test]
    async fn explicit_zero_charge_with_delay_skips_addon() {
        let fixture = Fixture::new().await;
        let mut cmd = command();
        cmd.initial_charge_amount = Some(0);
        cmd.first_charge_delay_days = Some(3);

        handler(&fixture).handle(cmd).await.unwrap();

        let request = fixture.gateway.last_created_request().unwrap();
        assert!(request.addons.is_empty());
    }

    #[tokio::test]
    async fn explicit_start_time_wins() {
        let fixture = Fixture::new().await;
        let start = Timestamp::now().plus_days(10).unwrap();
        let mut cmd = command();
        cmd.start_at = Some(start);
        cmd.initial_charge_amount = Some(5);

        let subscription = handler(&fixture).handle(cmd).await.unwrap();

        let request = fixture.gateway.last_created_request().unwrap();
        assert_eq!(request.start_at, start.as_unix_secs());
        assert_eq!(request.addons[0].item.amount, 500);
        assert_eq!(subscription.start_at, Some(start));
    }

    #[tokio::test]
    async fn oversized_delay_is_rejected_before_the_gateway() {
        let fixture = Fixture::new().await;
        let mut cmd = command();
        cmd.first_charge_delay_days = Some(200_000_000);

        let err = handler(&fixture).handle(cmd).await.unwrap_err();

        assert!(matches!(
            err,
            SubscriptionError::ValidationFailed { ref field, .. } if field == "first_charge_delay_days"
        ));
        assert!(fixture.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn counts_beyond_storage_range_never_reach_the_gateway() {
        let fixture = Fixture::new().await;

        let mut too_many = command();
        too_many.total_count = Some(3_000_000_000);
        let err = handler(&fixture).handle(too_many).await.unwrap_err();
        assert!(matches!(
            err,
            SubscriptionError::ValidationFailed { ref field, .. } if field == "total_count"
        ));

        let mut huge_quantity = command();
        huge_quantity.quantity = Some(i64::from(i32::MAX) + 1);
        let err = handler(&fixture).handle(huge_quantity).await.unwrap_err();
        assert!(matches!(
            err,
            SubscriptionError::ValidationFailed { ref field, .. } if field == "quantity"
        ));

        assert!(!fixture.gateway.was_called("create_subscription"));
    }

    #[tokio::test]
    async fn plan_id_is_trimmed_and_required() {
        let fixture = Fixture::new().await;
        let mut cmd = command();
        cmd.plan_id = "  plan_monthly ".to_string();
        handler(&fixture).handle(cmd).await.unwrap();
        assert_eq!(
            fixture.gateway.last_created_request().unwrap().plan_id,
            "plan_monthly"
        );

        let mut blank = command();
        blank.plan_id = "   ".to_string();
        let err = handler(&fixture).handle(blank).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::ValidationFailed { ref field, .. } if field == "plan_id"));
        assert_eq!(fixture.gateway.call_count("create_subscription"), 1);
    }

    #[tokio::test]
    async fn repeated_requests_create_distinct_records() {
        let fixture = Fixture::new().await;
        let handler = handler(&fixture);

        let first = handler.handle(command()).await.unwrap();
        let second = handler.handle(command()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_ne!(first.gateway_subscription_id(), second.gateway_subscription_id());
        let (_, total) = fixture
            .subscriptions
            .list(&SubscriptionFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn inactive_config_is_rejected() {
        let fixture = Fixture::new().await;
        let mut config = fixture.config.clone();
        config.is_active = false;
        fixture.configs.update(&config).await.unwrap();
        let mut cmd = command();
        cmd.config_id = Some(config.id);

        let err = handler(&fixture).handle(cmd).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::ConfigInactive(_)));
        assert!(!fixture.gateway.was_called("create_subscription"));
    }

    #[tokio::test]
    async fn app_without_config_in_environment_is_not_found() {
        let fixture = Fixture::new().await;
        let handler = CreateCheckoutHandler::new(
            fixture.configs.clone(),
            fixture.resolver.clone(),
            fixture.repository(),
            GatewayEnvironment::Live,
        );

        let err = handler.handle(command()).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::ConfigNotFound(_)));
    }

    #[tokio::test]
    async fn gateway_rejection_names_the_plan() {
        let fixture = Fixture::new().await;
        fixture.gateway.set_method_error(
            "create_subscription",
            GatewayError::invalid_request("The id provided does not exist"),
        );

        let err = handler(&fixture).handle(command()).await.unwrap_err();

        match err {
            SubscriptionError::GatewayRejected { context, .. } => {
                assert!(context.contains("plan_monthly"))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(fixture.subscriptions.is_empty().await);
    }

    #[tokio::test]
    async fn gateway_outage_is_retryable() {
        let fixture = Fixture::new().await;
        fixture
            .gateway
            .set_method_error("create_subscription", GatewayError::network("timeout"));

        let err = handler(&fixture).handle(command()).await.unwrap_err();

        assert!(err.is_retryable());
    }

    struct FailingRepository;

    #[async_trait]
    impl SubscriptionRepository for FailingRepository {
        async fn insert(&self, _: &Subscription) -> Result<(), DomainError> {
            Err(DomainError::database("connection reset"))
        }
        async fn update(&self, _: &Subscription) -> Result<(), DomainError> {
            unimplemented!()
        }
        async fn update_status(
            &self,
            _: &SubscriptionId,
            _: SubscriptionStatus,
            _: Timestamp,
        ) -> Result<(), DomainError> {
            unimplemented!()
        }
        async fn find_by_id(
            &self,
            _: &SubscriptionId,
        ) -> Result<Option<Subscription>, DomainError> {
            unimplemented!()
        }
        async fn find_by_gateway_id(&self, _: &str) -> Result<Option<Subscription>, DomainError> {
            unimplemented!()
        }
        async fn find_latest_by_contact(
            &self,
            _: &str,
            _: &str,
        ) -> Result<Option<Subscription>, DomainError> {
            unimplemented!()
        }
        async fn has_authenticated_by_contact(&self, _: &str, _: &str) -> Result<bool, DomainError> {
            unimplemented!()
        }
        async fn list(
            &self,
            _: &SubscriptionFilter,
            _: PageRequest,
        ) -> Result<(Vec<Subscription>, u64), DomainError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn save_failure_reports_orphan() {
        let fixture = Fixture::new().await;
        let handler = CreateCheckoutHandler::new(
            fixture.configs.clone(),
            fixture.resolver.clone(),
            Arc::new(FailingRepository),
            GatewayEnvironment::Test,
        );

        let err = handler.handle(command()).await.unwrap_err();

        match err {
            SubscriptionError::OrphanedGatewaySubscription {
                gateway_subscription_id,
                ..
            } => assert_eq!(gateway_subscription_id, "sub_mock_1"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(fixture.gateway.subscription("sub_mock_1").is_some());
    }

    #[test]
    fn contact_validation() {
        assert!(validate_phone("+919999999999").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("1234567890123456").is_err());
        // Only the length is checked; the gateway owns contact formatting.
        assert!(validate_phone("98-765 4321").is_ok());
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_app_name(&"x".repeat(101)).is_err());
    }
}
