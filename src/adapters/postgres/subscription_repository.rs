//! PostgreSQL implementation of SubscriptionRepository.

use crate::domain::foundation::{
    DomainError, ErrorCode, PageRequest, SubscriptionId, TenantConfigId, Timestamp, UserId,
};
use crate::domain::subscription::{
    Subscription, SubscriptionMetadata, SubscriptionRecord, SubscriptionStatus,
};
use crate::ports::{SubscriptionFilter, SubscriptionRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT id, razorpay_config_id, user_id, app_name, phone, email,
           razorpay_subscription_id, razorpay_customer_id, razorpay_plan_id,
           status, amount, currency, max_amount, frequency, total_count,
           start_at, end_at, next_charge_at, short_url, metadata,
           created_at, updated_at, deleted_at
    FROM subscriptions
"#;

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    razorpay_config_id: Uuid,
    user_id: Uuid,
    app_name: String,
    phone: String,
    email: String,
    razorpay_subscription_id: Option<String>,
    razorpay_customer_id: Option<String>,
    razorpay_plan_id: String,
    status: String,
    amount: i64,
    currency: String,
    max_amount: Option<i64>,
    frequency: String,
    total_count: i32,
    start_at: Option<DateTime<Utc>>,
    end_at: Option<DateTime<Utc>>,
    next_charge_at: Option<DateTime<Utc>>,
    short_url: String,
    metadata: Json<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let status: SubscriptionStatus = row.status.parse().map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid status value: {}", row.status),
            )
        })?;
        let total_count = u32::try_from(row.total_count).map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid total_count value: {}", row.total_count),
            )
        })?;

        Ok(Subscription::reconstitute(SubscriptionRecord {
            id: SubscriptionId::from_uuid(row.id),
            tenant_config_id: TenantConfigId::from_uuid(row.razorpay_config_id),
            user_id: UserId::from_uuid(row.user_id),
            app_name: row.app_name,
            phone: row.phone,
            email: row.email,
            gateway_subscription_id: row.razorpay_subscription_id,
            gateway_customer_id: row.razorpay_customer_id,
            gateway_plan_id: row.razorpay_plan_id,
            status,
            amount: row.amount,
            currency: row.currency,
            max_amount: row.max_amount,
            frequency: row.frequency,
            total_count,
            start_at: row.start_at.map(Timestamp::from_datetime),
            end_at: row.end_at.map(Timestamp::from_datetime),
            next_charge_at: row.next_charge_at.map(Timestamp::from_datetime),
            short_url: row.short_url,
            metadata: SubscriptionMetadata::from_value(row.metadata.0),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            deleted_at: row.deleted_at.map(Timestamp::from_datetime),
        }))
    }
}

fn optional_datetime(ts: &Option<Timestamp>) -> Option<DateTime<Utc>> {
    ts.as_ref().map(|t| *t.as_datetime())
}

fn total_count_column(subscription: &Subscription) -> Result<i32, DomainError> {
    i32::try_from(subscription.total_count).map_err(|_| {
        DomainError::new(ErrorCode::ValidationFailed, "total_count is out of range")
    })
}

fn query_error(operation: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to {}: {}", operation, e),
    )
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn insert(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, razorpay_config_id, user_id, app_name, phone, email,
                razorpay_subscription_id, razorpay_customer_id, razorpay_plan_id,
                status, amount, currency, max_amount, frequency, total_count,
                start_at, end_at, next_charge_at, short_url, metadata,
                created_at, updated_at, deleted_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23
            )
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.tenant_config_id.as_uuid())
        .bind(subscription.user_id.as_uuid())
        .bind(&subscription.app_name)
        .bind(&subscription.phone)
        .bind(&subscription.email)
        .bind(subscription.gateway_subscription_id())
        .bind(&subscription.gateway_customer_id)
        .bind(&subscription.gateway_plan_id)
        .bind(subscription.status.as_str())
        .bind(subscription.amount)
        .bind(&subscription.currency)
        .bind(subscription.max_amount)
        .bind(&subscription.frequency)
        .bind(total_count_column(subscription)?)
        .bind(optional_datetime(&subscription.start_at))
        .bind(optional_datetime(&subscription.end_at))
        .bind(optional_datetime(&subscription.next_charge_at))
        .bind(subscription.short_url())
        .bind(Json(subscription.metadata.to_value()))
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .bind(optional_datetime(&subscription.deleted_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("subscriptions_razorpay_subscription_id_key") {
                    return DomainError::database("Gateway subscription id already recorded");
                }
            }
            query_error("save subscription", e)
        })?;

        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                razorpay_customer_id = $2,
                status = $3,
                amount = $4,
                max_amount = $5,
                total_count = $6,
                start_at = $7,
                end_at = $8,
                next_charge_at = $9,
                metadata = $10,
                updated_at = $11
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(&subscription.gateway_customer_id)
        .bind(subscription.status.as_str())
        .bind(subscription.amount)
        .bind(subscription.max_amount)
        .bind(total_count_column(subscription)?)
        .bind(optional_datetime(&subscription.start_at))
        .bind(optional_datetime(&subscription.end_at))
        .bind(optional_datetime(&subscription.next_charge_at))
        .bind(Json(subscription.metadata.to_value()))
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("update subscription", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription not found: {}", subscription.id),
            ));
        }

        Ok(())
    }

    async fn update_status(
        &self,
        id: &SubscriptionId,
        status: SubscriptionStatus,
        updated_at: Timestamp,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET status = $2, updated_at = $3
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("update subscription status", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription not found: {}", id),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let sql = format!("{} WHERE id = $1 AND deleted_at IS NULL", SELECT_COLUMNS);
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("fetch subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_gateway_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let sql = format!(
            "{} WHERE razorpay_subscription_id = $1 AND deleted_at IS NULL",
            SELECT_COLUMNS
        );
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(gateway_subscription_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("fetch subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_latest_by_contact(
        &self,
        phone: &str,
        app_name: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let sql = format!(
            "{} WHERE phone = $1 AND app_name = $2 AND deleted_at IS NULL \
             ORDER BY created_at DESC, id DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(phone)
            .bind(app_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("fetch subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn has_authenticated_by_contact(
        &self,
        phone: &str,
        app_name: &str,
    ) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM subscriptions
                WHERE phone = $1 AND app_name = $2 AND deleted_at IS NULL
                  AND metadata -> 'authenticated' = 'true'::jsonb
            )
            "#,
        )
        .bind(phone)
        .bind(app_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_error("check authentication", e))?;

        Ok(exists)
    }

    async fn list(
        &self,
        filter: &SubscriptionFilter,
        page: PageRequest,
    ) -> Result<(Vec<Subscription>, u64), DomainError> {
        let app_name = filter.app_name.as_deref();
        let config_id = filter.tenant_config_id.map(|id| *id.as_uuid());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM subscriptions
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR app_name = $1)
              AND ($2::uuid IS NULL OR razorpay_config_id = $2)
            "#,
        )
        .bind(app_name)
        .bind(config_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_error("count subscriptions", e))?;

        let sql = format!(
            "{} WHERE deleted_at IS NULL \
               AND ($1::text IS NULL OR app_name = $1) \
               AND ($2::uuid IS NULL OR razorpay_config_id = $2) \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
            SELECT_COLUMNS
        );
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(app_name)
            .bind(config_id)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("list subscriptions", e))?;

        let subscriptions = rows
            .into_iter()
            .map(Subscription::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((subscriptions, total.max(0) as u64))
    }
}
