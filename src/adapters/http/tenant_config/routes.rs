//! Axum router configuration for tenant config endpoints.

use axum::{routing::get, Router};

use super::handlers::{
    create_config, delete_config, get_config, get_config_by_app, list_configs, update_config,
    TenantConfigAppState,
};

/// Create the config router, mounted at `/api/v1/configs`.
///
/// # Routes
/// - `POST /` - Register gateway credentials for a tenant
/// - `GET /` - Paginated listing
/// - `GET /by-app` - Active config for (app, environment)
/// - `GET /:id`, `PUT /:id`, `DELETE /:id`
pub fn tenant_config_routes() -> Router<TenantConfigAppState> {
    Router::new()
        .route("/", get(list_configs).post(create_config))
        .route("/by-app", get(get_config_by_app))
        .route("/:id", get(get_config).put(update_config).delete(delete_config))
}
