//! Top-level API router.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use super::subscription::{subscription_routes, SubscriptionAppState};
use super::tenant_config::{tenant_config_routes, TenantConfigAppState};

/// Mounts every endpoint:
/// - `/api/v1/subscriptions/...`
/// - `/api/v1/configs/...`
/// - `GET /health`
pub fn api_router(subscriptions: SubscriptionAppState, configs: TenantConfigAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest(
            "/api/v1/subscriptions",
            subscription_routes().with_state(subscriptions),
        )
        .nest("/api/v1/configs", tenant_config_routes().with_state(configs))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
