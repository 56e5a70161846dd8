//! HTTP handlers for tenant config endpoints.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use secrecy::SecretString;

use crate::application::handlers::tenant_config::{
    CreateTenantConfigCommand, CreateTenantConfigHandler, DeleteTenantConfigCommand,
    DeleteTenantConfigHandler, GetTenantConfigHandler, GetTenantConfigQuery,
    ListTenantConfigsHandler, ListTenantConfigsQuery, TenantConfigStore,
    UpdateTenantConfigCommand, UpdateTenantConfigHandler,
};
use crate::domain::foundation::TenantConfigId;
use crate::domain::tenant::TenantConfigError;

use super::dto::{
    ByAppQuery, CreateTenantConfigRequest, ListTenantConfigsParams, MessageResponse,
    TenantConfigPage, TenantConfigResponse, UpdateTenantConfigRequest,
};
use crate::adapters::http::ErrorResponse;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct TenantConfigAppState {
    pub store: Arc<TenantConfigStore>,
}

impl TenantConfigAppState {
    pub fn new(store: Arc<TenantConfigStore>) -> Self {
        Self { store }
    }

    pub fn create_handler(&self) -> CreateTenantConfigHandler {
        CreateTenantConfigHandler::new(self.store.clone())
    }

    pub fn get_handler(&self) -> GetTenantConfigHandler {
        GetTenantConfigHandler::new(self.store.clone())
    }

    pub fn list_handler(&self) -> ListTenantConfigsHandler {
        ListTenantConfigsHandler::new(self.store.clone())
    }

    pub fn update_handler(&self) -> UpdateTenantConfigHandler {
        UpdateTenantConfigHandler::new(self.store.clone())
    }

    pub fn delete_handler(&self) -> DeleteTenantConfigHandler {
        DeleteTenantConfigHandler::new(self.store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /configs
pub async fn create_config(
    State(state): State<TenantConfigAppState>,
    Json(request): Json<CreateTenantConfigRequest>,
) -> Result<impl IntoResponse, TenantConfigApiError> {
    let cmd = CreateTenantConfigCommand {
        app_name: request.app_name,
        environment: request.environment,
        key_id: request.razorpay_key_id.unwrap_or_else(empty_secret),
        key_secret: request.razorpay_key_secret.unwrap_or_else(empty_secret),
        webhook_secret: request.razorpay_webhook_secret.unwrap_or_else(empty_secret),
        is_active: request.is_active,
        metadata: request.metadata,
    };

    let config = state.create_handler().handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(TenantConfigResponse::from(config))))
}

/// GET /configs/:id
pub async fn get_config(
    State(state): State<TenantConfigAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, TenantConfigApiError> {
    let id = parse_id(&id)?;
    let config = state.get_handler().handle(GetTenantConfigQuery::ById(id)).await?;
    Ok(Json(TenantConfigResponse::from(config)))
}

/// GET /configs/by-app?app_name=&environment=
pub async fn get_config_by_app(
    State(state): State<TenantConfigAppState>,
    Query(query): Query<ByAppQuery>,
) -> Result<impl IntoResponse, TenantConfigApiError> {
    let config = state
        .get_handler()
        .handle(GetTenantConfigQuery::ByTenant {
            app_name: query.app_name,
            environment: query.environment,
        })
        .await?;
    Ok(Json(TenantConfigResponse::from(config)))
}

/// GET /configs?page=&page_size=&active_only=
pub async fn list_configs(
    State(state): State<TenantConfigAppState>,
    Query(params): Query<ListTenantConfigsParams>,
) -> Result<impl IntoResponse, TenantConfigApiError> {
    let page = state
        .list_handler()
        .handle(ListTenantConfigsQuery {
            page: params.page,
            page_size: params.page_size,
            active_only: params.active_only,
        })
        .await?;

    let page: TenantConfigPage = page.map(TenantConfigResponse::from);
    Ok(Json(page))
}

/// PUT /configs/:id
pub async fn update_config(
    State(state): State<TenantConfigAppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTenantConfigRequest>,
) -> Result<impl IntoResponse, TenantConfigApiError> {
    let id = parse_id(&id)?;
    let config = state
        .update_handler()
        .handle(UpdateTenantConfigCommand {
            id,
            changes: request.into(),
        })
        .await?;
    Ok(Json(TenantConfigResponse::from(config)))
}

/// DELETE /configs/:id
pub async fn delete_config(
    State(state): State<TenantConfigAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, TenantConfigApiError> {
    let id = parse_id(&id)?;
    state
        .delete_handler()
        .handle(DeleteTenantConfigCommand { id })
        .await?;
    Ok(Json(MessageResponse {
        message: "razorpay config deleted successfully".to_string(),
    }))
}

fn parse_id(raw: &str) -> Result<TenantConfigId, TenantConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| TenantConfigError::validation("id", "must be a valid UUID"))
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts tenant config errors to HTTP responses.
#[derive(Debug)]
pub struct TenantConfigApiError(TenantConfigError);

impl From<TenantConfigError> for TenantConfigApiError {
    fn from(err: TenantConfigError) -> Self {
        Self(err)
    }
}

impl IntoResponse for TenantConfigApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            TenantConfigError::NotFound(_) | TenantConfigError::NotFoundForTenant(_) => {
                StatusCode::NOT_FOUND
            }
            TenantConfigError::AlreadyExists(_) => StatusCode::CONFLICT,
            TenantConfigError::Inactive(_) | TenantConfigError::ValidationFailed { .. } => {
                StatusCode::BAD_REQUEST
            }
            TenantConfigError::CorruptCiphertext(_)
            | TenantConfigError::Encryption(_)
            | TenantConfigError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let code = self.0.code().to_string();
        let message = self.0.message();
        let body = match &self.0 {
            TenantConfigError::ValidationFailed { field, .. } => {
                ErrorResponse::with_details(code, message, serde_json::json!({ "field": field }))
            }
            _ => ErrorResponse::new(code, message),
        };

        if status.is_server_error() {
            tracing::error!(error_code = %body.error_code, error = %self.0, "Config request failed");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tenant::{GatewayEnvironment, TenantKey};

    #[test]
    fn conflict_maps_to_409() {
        let tenant = TenantKey::new("astro", GatewayEnvironment::Test).unwrap();
        let response = TenantConfigApiError::from(TenantConfigError::AlreadyExists(tenant)).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn corrupt_ciphertext_is_a_server_error() {
        let response =
            TenantConfigApiError::from(TenantConfigError::CorruptCiphertext("bad tag".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_id_is_a_validation_error() {
        let err = parse_id("nope").unwrap_err();
        assert_eq!(err.code(), crate::domain::foundation::ErrorCode::ValidationFailed);
    }
}
