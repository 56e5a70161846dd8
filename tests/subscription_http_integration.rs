//! Integration tests for the HTTP API.
//!
//! The full router runs against in-memory repositories and the mock
//! gateway, so every request travels the same path as in production:
//! routing, DTO decoding, handlers, the config store with real encryption,
//! and the gateway client cache.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use autopay_backend::adapters::crypto::AesGcmSecretCodec;
use autopay_backend::adapters::http::{api_router, SubscriptionAppState, TenantConfigAppState};
use autopay_backend::adapters::memory::{
    InMemorySubscriptionRepository, InMemoryTenantConfigRepository,
};
use autopay_backend::adapters::razorpay::{MockConnector, MockGateway};
use autopay_backend::adapters::GatewayClientCache;
use autopay_backend::application::handlers::tenant_config::TenantConfigStore;
use autopay_backend::domain::subscription::{compute_signature, payment_message};
use autopay_backend::domain::tenant::GatewayEnvironment;

const KEY_SECRET: &str = "key_secret";
const WEBHOOK_SECRET: &str = "whsec";
const PHONE: &str = "+919999999999";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    gateway: MockGateway,
}

impl TestApp {
    fn new() -> Self {
        let codec = AesGcmSecretCodec::new(&[7u8; 32]).unwrap();
        let configs = Arc::new(TenantConfigStore::new(
            Arc::new(InMemoryTenantConfigRepository::new()),
            Arc::new(codec),
        ));

        let gateway = MockGateway::new();
        gateway.add_simple_plan("plan_monthly", 49900, "monthly");
        let cache = GatewayClientCache::new(Arc::new(MockConnector::new(gateway.clone())));

        let subscriptions = SubscriptionAppState {
            configs: configs.clone(),
            gateways: Arc::new(cache),
            subscription_repository: Arc::new(InMemorySubscriptionRepository::new()),
            environment: GatewayEnvironment::Test,
        };

        Self {
            router: api_router(subscriptions, TenantConfigAppState::new(configs)),
            gateway,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn send_json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn webhook(&self, body: &Value, signature: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/subscriptions/webhook")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header("X-Razorpay-Signature", signature);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn register_config(&self, app_name: &str) -> (StatusCode, Value) {
        self.send_json(
            "POST",
            "/api/v1/configs",
            json!({
                "app_name": app_name,
                "environment": "test",
                "razorpay_key_id": "rzp_test_key",
                "razorpay_key_secret": KEY_SECRET,
                "razorpay_webhook_secret": WEBHOOK_SECRET,
                "metadata": {"team": "growth"}
            }),
        )
        .await
    }

    async fn checkout(&self, app_name: &str) -> (StatusCode, Value) {
        self.send_json(
            "POST",
            "/api/v1/subscriptions/checkout",
            json!({
                "user_id": Uuid::new_v4().to_string(),
                "app_name": app_name,
                "phone": PHONE,
                "email": "user@example.com",
                "plan_id": "plan_monthly"
            }),
        )
        .await
    }
}

fn event(name: &str, gateway_id: &str, status: &str) -> Value {
    json!({
        "entity": "event",
        "event": name,
        "payload": {
            "subscription": {"entity": {
                "id": gateway_id,
                "status": status,
                "customer_id": "cust_42",
                "start_at": 1_900_000_000,
                "charge_at": 1_902_592_000
            }},
            "payment": {"entity": {"id": "pay_7", "amount": 49900}}
        },
        "created_at": 1_900_000_100
    })
}

fn sign(secret: &str, body: &Value) -> String {
    compute_signature(secret.as_bytes(), body.to_string().as_bytes())
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// =============================================================================
// Tenant configs
// =============================================================================

#[tokio::test]
async fn config_lifecycle_over_http() {
    let app = TestApp::new();

    let (status, created) = app.register_config("fitness").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["app_name"], "fitness");
    assert_eq!(created["environment"], "test");
    assert_eq!(created["is_active"], true);
    assert!(created.get("razorpay_key_secret").is_none());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, duplicate) = app.register_config("fitness").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(duplicate["error_code"], "CONFIG_EXISTS");

    let (status, by_app) = app
        .get("/api/v1/configs/by-app?app_name=fitness&environment=test")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_app["id"], id.as_str());

    let (status, page) = app.get("/api/v1/configs?page=1&page_size=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);

    let (status, updated) = app
        .send_json(
            "PUT",
            &format!("/api/v1/configs/{}", id),
            json!({"is_active": false}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["is_active"], false);

    let (status, _) = app
        .send(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/configs/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/api/v1/configs/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn config_without_secrets_is_rejected() {
    let app = TestApp::new();

    let (status, _) = app
        .send_json(
            "POST",
            "/api/v1/configs",
            json!({"app_name": "fitness", "environment": "test"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Subscription flow
// =============================================================================

#[tokio::test]
async fn checkout_verify_webhook_and_cancel() {
    let app = TestApp::new();
    app.register_config("fitness").await;

    // Checkout
    let (status, checkout) = app.checkout("fitness").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(checkout["status"], "created");
    assert_eq!(checkout["razorpay_subscription_id"], "sub_mock_1");
    assert!(checkout["short_url"].as_str().unwrap().starts_with("https://"));
    let id = checkout["subscription_id"].as_str().unwrap().to_string();
    assert!(app.gateway.was_called("create_subscription"));

    // Callback verification
    let signature = compute_signature(
        KEY_SECRET.as_bytes(),
        payment_message("pay_7", "sub_mock_1").as_bytes(),
    );
    let (status, verified) = app
        .send_json(
            "POST",
            "/api/v1/subscriptions/verify",
            json!({
                "razorpay_payment_id": "pay_7",
                "razorpay_subscription_id": "sub_mock_1",
                "razorpay_signature": signature
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["subscription"]["status"], "authenticated");

    let (status, auth) = app
        .get("/api/v1/subscriptions/authentication-status?phone=%2B919999999999&app_name=fitness")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(auth["has_authenticated"], true);

    // Webhooks
    let authenticated = event("subscription.authenticated", "sub_mock_1", "authenticated");
    let (status, ack) = app
        .webhook(&authenticated, Some(&sign(WEBHOOK_SECRET, &authenticated)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["outcome"], "applied");

    let charged = event("subscription.charged", "sub_mock_1", "active");
    let (status, ack) = app
        .webhook(&charged, Some(&sign(WEBHOOK_SECRET, &charged)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "ok");
    assert_eq!(ack["outcome"], "applied");

    let (status, by_gateway) = app.get("/api/v1/subscriptions/razorpay/sub_mock_1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_gateway["status"], "active");
    assert_eq!(by_gateway["razorpay_customer_id"], "cust_42");

    // Queries
    let (status, by_id) = app.get(&format!("/api/v1/subscriptions/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id["id"], id.as_str());

    let (status, latest) = app
        .get("/api/v1/subscriptions/latest?phone=%2B919999999999&app_name=fitness")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["id"], id.as_str());

    let (status, page) = app.get("/api/v1/subscriptions?app_name=fitness").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["id"], id.as_str());

    // Cancel
    let (status, cancelled) = app
        .send(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/subscriptions/{}/cancel", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["subscription_id"], id.as_str());
    assert!(app.gateway.was_called("cancel_subscription"));

    let (_, after) = app.get(&format!("/api/v1/subscriptions/{}", id)).await;
    assert_eq!(after["status"], "cancelled");

    // A late authentication event does not revive the subscription
    let late = event("subscription.authenticated", "sub_mock_1", "authenticated");
    let (status, ack) = app.webhook(&late, Some(&sign(WEBHOOK_SECRET, &late))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["outcome"], "ignored");

    let (_, after) = app.get(&format!("/api/v1/subscriptions/{}", id)).await;
    assert_eq!(after["status"], "cancelled");
}

#[tokio::test]
async fn checkout_for_unknown_app_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app.checkout("nobody").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error_code"].is_string());
    assert!(!app.gateway.was_called("create_subscription"));
}

#[tokio::test]
async fn checkout_with_bad_user_id_is_a_validation_error() {
    let app = TestApp::new();
    app.register_config("fitness").await;

    let (status, body) = app
        .send_json(
            "POST",
            "/api/v1/subscriptions/checkout",
            json!({
                "user_id": "not-a-uuid",
                "app_name": "fitness",
                "phone": PHONE,
                "email": "user@example.com",
                "plan_id": "plan_monthly"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "user_id");
}

#[tokio::test]
async fn verify_with_wrong_secret_is_unauthorized() {
    let app = TestApp::new();
    app.register_config("fitness").await;
    app.checkout("fitness").await;

    let forged = compute_signature(b"other", payment_message("pay_7", "sub_mock_1").as_bytes());
    let (status, _) = app
        .send_json(
            "POST",
            "/api/v1/subscriptions/verify",
            json!({
                "razorpay_payment_id": "pay_7",
                "razorpay_subscription_id": "sub_mock_1",
                "razorpay_signature": forged
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, stored) = app.get("/api/v1/subscriptions/razorpay/sub_mock_1").await;
    assert_eq!(stored["status"], "created");
}

#[tokio::test]
async fn webhook_signature_is_required_and_checked() {
    let app = TestApp::new();
    app.register_config("fitness").await;
    app.checkout("fitness").await;
    let body = event("subscription.activated", "sub_mock_1", "active");

    let (status, missing) = app.webhook(&body, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(missing["details"]["field"], "X-Razorpay-Signature");

    let (status, _) = app.webhook(&body, Some(&sign("wrong", &body))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, stored) = app.get("/api/v1/subscriptions/razorpay/sub_mock_1").await;
    assert_eq!(stored["status"], "created");
}

#[tokio::test]
async fn webhook_for_unknown_subscription_is_not_found() {
    let app = TestApp::new();
    let body = event("subscription.charged", "sub_ghost", "active");

    let (status, _) = app.webhook(&body, Some(&sign(WEBHOOK_SECRET, &body))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lookups_of_missing_subscriptions_are_not_found() {
    let app = TestApp::new();

    let (status, _) = app
        .get(&format!("/api/v1/subscriptions/{}", Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/v1/subscriptions/razorpay/sub_none").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .get("/api/v1/subscriptions/latest?phone=%2B919999999999&app_name=fitness")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, auth) = app
        .get("/api/v1/subscriptions/authentication-status?phone=%2B919999999999&app_name=fitness")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(auth["has_authenticated"], false);
}
