//! HTTP handlers for subscription endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CheckAuthenticationHandler,
    CheckAuthenticationQuery, CreateCheckoutCommand, CreateCheckoutHandler,
    GetSubscriptionHandler, GetSubscriptionQuery, HandleWebhookCommand, HandleWebhookHandler,
    ListSubscriptionsHandler, ListSubscriptionsQuery, VerifyPaymentCommand, VerifyPaymentHandler,
};
use crate::application::handlers::tenant_config::TenantConfigStore;
use crate::domain::foundation::{DomainError, SubscriptionId, TenantConfigId, Timestamp, UserId};
use crate::domain::subscription::SubscriptionError;
use crate::domain::tenant::GatewayEnvironment;
use crate::ports::{GatewayResolver, SubscriptionRepository};

use super::dto::{
    CancelResponse, CheckoutResponse, ContactQuery, CreateCheckoutRequest,
    ListSubscriptionsParams, SubscriptionPage, SubscriptionResponse, VerifyPaymentRequest,
    VerifyPaymentResponse, WebhookResponse,
};
use crate::adapters::http::ErrorResponse;

/// Header carrying the webhook HMAC.
pub const SIGNATURE_HEADER: &str = "X-Razorpay-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for subscription routes. Handlers are built per request.
#[derive(Clone)]
pub struct SubscriptionAppState {
    pub configs: Arc<TenantConfigStore>,
    pub gateways: Arc<dyn GatewayResolver>,
    pub subscription_repository: Arc<dyn SubscriptionRepository>,
    /// Gateway environment that app-name checkouts resolve against.
    pub environment: GatewayEnvironment,
}

impl SubscriptionAppState {
    pub fn create_checkout_handler(&self) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(
            self.configs.clone(),
            self.gateways.clone(),
            self.subscription_repository.clone(),
            self.environment,
        )
    }

    pub fn verify_payment_handler(&self) -> VerifyPaymentHandler {
        VerifyPaymentHandler::new(
            self.configs.clone(),
            self.gateways.clone(),
            self.subscription_repository.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandleWebhookHandler {
        HandleWebhookHandler::new(self.configs.clone(), self.subscription_repository.clone())
    }

    pub fn get_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.subscription_repository.clone())
    }

    pub fn list_subscriptions_handler(&self) -> ListSubscriptionsHandler {
        ListSubscriptionsHandler::new(self.subscription_repository.clone())
    }

    pub fn cancel_subscription_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(
            self.configs.clone(),
            self.gateways.clone(),
            self.subscription_repository.clone(),
        )
    }

    pub fn check_authentication_handler(&self) -> CheckAuthenticationHandler {
        CheckAuthenticationHandler::new(self.subscription_repository.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /subscriptions/checkout - Create a subscription and its checkout link
pub async fn create_checkout(
    State(state): State<SubscriptionAppState>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let user_id: UserId = parse_field("user_id", &request.user_id)?;
    let config_id = request
        .config_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| parse_field::<TenantConfigId>("config_id", id))
        .transpose()?;
    let start_at = request
        .start_at
        .map(|secs| {
            Timestamp::from_unix_secs(secs)
                .ok_or_else(|| SubscriptionError::validation("start_at", "not a valid unix time"))
        })
        .transpose()?;

    let cmd = CreateCheckoutCommand {
        user_id,
        config_id,
        app_name: request.app_name,
        phone: request.phone,
        email: request.email,
        plan_id: request.plan_id,
        total_count: request.total_count,
        start_at,
        quantity: request.quantity,
        notes: request.notes,
        initial_charge_amount: request.initial_charge_amount,
        first_charge_delay_days: request.first_charge_delay_days,
    };

    let subscription = state.create_checkout_handler().handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(CheckoutResponse::from(&subscription))))
}

/// POST /subscriptions/verify - Check the checkout callback signature
pub async fn verify_payment(
    State(state): State<SubscriptionAppState>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let cmd = VerifyPaymentCommand {
        payment_id: request.razorpay_payment_id,
        gateway_subscription_id: request.razorpay_subscription_id,
        signature: request.razorpay_signature,
    };

    let subscription = state.verify_payment_handler().handle(cmd).await?;

    Ok(Json(VerifyPaymentResponse {
        subscription: SubscriptionResponse::from(subscription),
        message: "payment verified successfully".to_string(),
    }))
}

/// POST /subscriptions/webhook - Gateway event ingestion
pub async fn handle_webhook(
    State(state): State<SubscriptionAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| SubscriptionError::validation(SIGNATURE_HEADER, "missing signature header"))?;

    let cmd = HandleWebhookCommand {
        body: body.to_vec(),
        signature: signature.to_string(),
    };

    let outcome = state.webhook_handler().handle(cmd).await?;

    Ok(Json(WebhookResponse::from(outcome)))
}

/// POST /subscriptions/:id/cancel - Cancel immediately
pub async fn cancel_subscription(
    State(state): State<SubscriptionAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let id: SubscriptionId = parse_field("id", &id)?;

    let subscription = state
        .cancel_subscription_handler()
        .handle(CancelSubscriptionCommand { id })
        .await?;

    Ok(Json(CancelResponse {
        message: "subscription cancelled".to_string(),
        subscription_id: subscription.id.to_string(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /subscriptions/:id
pub async fn get_subscription(
    State(state): State<SubscriptionAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let id: SubscriptionId = parse_field("id", &id)?;
    let subscription = state
        .get_subscription_handler()
        .handle(GetSubscriptionQuery::ById(id))
        .await?;
    Ok(Json(SubscriptionResponse::from(subscription)))
}

/// GET /subscriptions/razorpay/:id
pub async fn get_subscription_by_gateway_id(
    State(state): State<SubscriptionAppState>,
    Path(gateway_id): Path<String>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let subscription = state
        .get_subscription_handler()
        .handle(GetSubscriptionQuery::ByGatewayId(gateway_id))
        .await?;
    Ok(Json(SubscriptionResponse::from(subscription)))
}

/// GET /subscriptions/latest?phone=&app_name=
pub async fn get_latest_subscription(
    State(state): State<SubscriptionAppState>,
    Query(query): Query<ContactQuery>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let subscription = state
        .get_subscription_handler()
        .handle(GetSubscriptionQuery::LatestByContact {
            phone: query.phone,
            app_name: query.app_name,
        })
        .await?;
    Ok(Json(SubscriptionResponse::from(subscription)))
}

/// GET /subscriptions/authentication-status?phone=&app_name=
pub async fn get_authentication_status(
    State(state): State<SubscriptionAppState>,
    Query(query): Query<ContactQuery>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let status = state
        .check_authentication_handler()
        .handle(CheckAuthenticationQuery {
            phone: query.phone,
            app_name: query.app_name,
        })
        .await?;
    Ok(Json(status))
}

/// GET /subscriptions?app_name=&config_id=&page=&page_size=
pub async fn list_subscriptions(
    State(state): State<SubscriptionAppState>,
    Query(params): Query<ListSubscriptionsParams>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let config_id = params
        .config_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .map(|id| parse_field::<TenantConfigId>("config_id", id))
        .transpose()?;

    let page = state
        .list_subscriptions_handler()
        .handle(ListSubscriptionsQuery {
            app_name: params.app_name,
            config_id,
            page: params.page,
            page_size: params.page_size,
        })
        .await?;

    let page: SubscriptionPage = page.map(SubscriptionResponse::from);
    Ok(Json(page))
}

fn parse_field<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, SubscriptionError> {
    raw.trim()
        .parse()
        .map_err(|_| SubscriptionError::validation(field, "must be a valid UUID"))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts subscription errors to HTTP responses.
#[derive(Debug)]
pub struct SubscriptionApiError(SubscriptionError);

impl From<SubscriptionError> for SubscriptionApiError {
    fn from(err: SubscriptionError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for SubscriptionApiError {
    fn from(err: DomainError) -> Self {
        Self(SubscriptionError::from(err))
    }
}

impl SubscriptionApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SubscriptionError::NotFound(_)
            | SubscriptionError::GatewayIdNotFound(_)
            | SubscriptionError::NotFoundForContact { .. }
            | SubscriptionError::ConfigNotFound(_) => StatusCode::NOT_FOUND,
            SubscriptionError::ValidationFailed { .. }
            | SubscriptionError::MalformedWebhook(_)
            | SubscriptionError::ConfigInactive(_)
            | SubscriptionError::GatewayRejected { .. } => StatusCode::BAD_REQUEST,
            SubscriptionError::InvalidPaymentSignature
            | SubscriptionError::InvalidWebhookSignature => StatusCode::UNAUTHORIZED,
            SubscriptionError::GatewayUnavailable { .. } => StatusCode::BAD_GATEWAY,
            SubscriptionError::OrphanedGatewaySubscription { .. }
            | SubscriptionError::CredentialsUnavailable(_)
            | SubscriptionError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SubscriptionApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let code = self.0.code().to_string();
        let message = self.0.message();

        let body = match &self.0 {
            SubscriptionError::ValidationFailed { field, .. } => {
                ErrorResponse::with_details(code, message, serde_json::json!({ "field": field }))
            }
            SubscriptionError::GatewayUnavailable { .. } => ErrorResponse::with_details(
                code,
                message,
                serde_json::json!({ "retryable": true }),
            ),
            _ => ErrorResponse::new(code, message),
        };

        if status.is_server_error() {
            tracing::error!(error_code = %body.error_code, message = %body.message, "Subscription request failed");
        }

        (status, Json(body)).into_response()
    }
}
