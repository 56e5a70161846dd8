//! PostgreSQL implementation of TenantConfigRepository.
//!
//! Rows hold ciphertext only. Uniqueness of (app_name, environment) among
//! non-deleted rows is enforced by a partial unique index.

use crate::domain::foundation::{DomainError, ErrorCode, PageRequest, TenantConfigId, Timestamp};
use crate::domain::tenant::{GatewayEnvironment, TenantKey};
use crate::ports::{StoredTenantConfig, TenantConfigRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

pub struct PostgresTenantConfigRepository {
    pool: PgPool,
}

impl PostgresTenantConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TenantConfigRow {
    id: Uuid,
    app_name: String,
    environment: String,
    encrypted_key_id: String,
    encrypted_key_secret: String,
    encrypted_webhook_secret: String,
    is_active: bool,
    metadata: Json<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TenantConfigRow> for StoredTenantConfig {
    type Error = DomainError;

    fn try_from(row: TenantConfigRow) -> Result<Self, Self::Error> {
        let environment: GatewayEnvironment = row.environment.parse().map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid environment value: {}", row.environment),
            )
        })?;
        let metadata = match row.metadata.0 {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Ok(StoredTenantConfig {
            id: TenantConfigId::from_uuid(row.id),
            app_name: row.app_name,
            environment,
            encrypted_key_id: row.encrypted_key_id,
            encrypted_key_secret: row.encrypted_key_secret,
            encrypted_webhook_secret: row.encrypted_webhook_secret,
            is_active: row.is_active,
            metadata,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn query_error(operation: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to {}: {}", operation, e),
    )
}

#[async_trait]
impl TenantConfigRepository for PostgresTenantConfigRepository {
    async fn insert(&self, config: &StoredTenantConfig) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO razorpay_configs (
                id, app_name, environment, encrypted_key_id, encrypted_key_secret,
                encrypted_webhook_secret, is_active, metadata, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(config.id.as_uuid())
        .bind(&config.app_name)
        .bind(config.environment.as_str())
        .bind(&config.encrypted_key_id)
        .bind(&config.encrypted_key_secret)
        .bind(&config.encrypted_webhook_secret)
        .bind(config.is_active)
        .bind(Json(Value::Object(config.metadata.clone())))
        .bind(config.created_at.as_datetime())
        .bind(config.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                    return DomainError::new(
                        ErrorCode::TenantConfigExists,
                        "app_name and environment combination already exists",
                    );
                }
            }
            query_error("save config", e)
        })?;

        Ok(())
    }

    async fn update(&self, config: &StoredTenantConfig) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE razorpay_configs SET
                encrypted_key_id = $2,
                encrypted_key_secret = $3,
                encrypted_webhook_secret = $4,
                is_active = $5,
                metadata = $6,
                updated_at = $7
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(config.id.as_uuid())
        .bind(&config.encrypted_key_id)
        .bind(&config.encrypted_key_secret)
        .bind(&config.encrypted_webhook_secret)
        .bind(config.is_active)
        .bind(Json(Value::Object(config.metadata.clone())))
        .bind(config.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("update config", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::TenantConfigNotFound,
                format!("Config not found: {}", config.id),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &TenantConfigId) -> Result<Option<StoredTenantConfig>, DomainError> {
        let row: Option<TenantConfigRow> = sqlx::query_as(
            r#"
            SELECT id, app_name, environment, encrypted_key_id, encrypted_key_secret,
                   encrypted_webhook_secret, is_active, metadata, created_at, updated_at
            FROM razorpay_configs
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("fetch config", e))?;

        row.map(StoredTenantConfig::try_from).transpose()
    }

    async fn find_by_tenant(&self, tenant: &TenantKey) -> Result<Option<StoredTenantConfig>, DomainError> {
        let row: Option<TenantConfigRow> = sqlx::query_as(
            r#"
            SELECT id, app_name, environment, encrypted_key_id, encrypted_key_secret,
                   encrypted_webhook_secret, is_active, metadata, created_at, updated_at
            FROM razorpay_configs
            WHERE app_name = $1 AND environment = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(tenant.app_name())
        .bind(tenant.environment().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("fetch config", e))?;

        row.map(StoredTenantConfig::try_from).transpose()
    }

    async fn list(
        &self,
        page: PageRequest,
        active_only: bool,
    ) -> Result<(Vec<StoredTenantConfig>, u64), DomainError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM razorpay_configs
            WHERE deleted_at IS NULL AND (NOT $1 OR is_active)
            "#,
        )
        .bind(active_only)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_error("count configs", e))?;

        let rows: Vec<TenantConfigRow> = sqlx::query_as(
            r#"
            SELECT id, app_name, environment, encrypted_key_id, encrypted_key_secret,
                   encrypted_webhook_secret, is_active, metadata, created_at, updated_at
            FROM razorpay_configs
            WHERE deleted_at IS NULL AND (NOT $1 OR is_active)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(active_only)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("list configs", e))?;

        let configs = rows
            .into_iter()
            .map(StoredTenantConfig::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((configs, total.max(0) as u64))
    }

    async fn soft_delete(&self, id: &TenantConfigId, deleted_at: Timestamp) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE razorpay_configs
            SET deleted_at = $2, is_active = FALSE, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(deleted_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("delete config", e))?;

        Ok(result.rows_affected() > 0)
    }
}
