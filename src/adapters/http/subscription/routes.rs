//! Axum router configuration for subscription endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_subscription, create_checkout, get_authentication_status, get_latest_subscription,
    get_subscription, get_subscription_by_gateway_id, handle_webhook, list_subscriptions,
    verify_payment, SubscriptionAppState,
};

/// Create the subscription router, mounted at `/api/v1/subscriptions`.
///
/// # Routes
/// - `GET /` - List subscriptions
/// - `POST /checkout` - Create subscription and checkout link
/// - `POST /verify` - Verify checkout callback signature
/// - `POST /webhook` - Gateway events (signature verified, no auth)
/// - `GET /latest` - Latest subscription for a contact
/// - `GET /authentication-status` - Whether a contact ever authorized a mandate
/// - `GET /razorpay/:id` - Lookup by gateway subscription id
/// - `GET /:id` - Lookup by internal id
/// - `POST /:id/cancel` - Cancel immediately
pub fn subscription_routes() -> Router<SubscriptionAppState> {
    Router::new()
        .route("/", get(list_subscriptions))
        .route("/checkout", post(create_checkout))
        .route("/verify", post(verify_payment))
        .route("/webhook", post(handle_webhook))
        .route("/latest", get(get_latest_subscription))
        .route("/authentication-status", get(get_authentication_status))
        .route("/razorpay/:id", get(get_subscription_by_gateway_id))
        .route("/:id", get(get_subscription))
        .route("/:id/cancel", post(cancel_subscription))
}
