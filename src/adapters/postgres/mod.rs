//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresTenantConfigRepository` - Encrypted tenant gateway configs
//! - `PostgresSubscriptionRepository` - Local subscription mirror

mod subscription_repository;
mod tenant_config_repository;

pub use subscription_repository::PostgresSubscriptionRepository;
pub use tenant_config_repository::PostgresTenantConfigRepository;

use crate::config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Opens the connection pool and, when configured, applies pending migrations.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(config.connect_options()?)
        .await?;

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}
