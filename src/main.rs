//! Autopay backend service entry point.
//!
//! Loads configuration, initialises tracing, wires repositories, the
//! credential codec and the gateway client cache into the HTTP routers,
//! then serves until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use autopay_backend::adapters::crypto::AesGcmSecretCodec;
use autopay_backend::adapters::http::{api_router, SubscriptionAppState, TenantConfigAppState};
use autopay_backend::adapters::postgres::{
    self, PostgresSubscriptionRepository, PostgresTenantConfigRepository,
};
use autopay_backend::adapters::razorpay::RazorpayConnector;
use autopay_backend::adapters::GatewayClientCache;
use autopay_backend::application::handlers::tenant_config::TenantConfigStore;
use autopay_backend::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config);
    config.validate().context("invalid configuration")?;

    let addr = config.server.socket_addr()?;
    let pool = postgres::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    let codec = AesGcmSecretCodec::from_secret(&config.payment.encryption_key)
        .context("invalid encryption key")?;
    let configs = Arc::new(TenantConfigStore::new(
        Arc::new(PostgresTenantConfigRepository::new(pool.clone())),
        Arc::new(codec),
    ));

    let connector = RazorpayConnector::new(
        config.payment.gateway_base_url.clone(),
        config.payment.gateway_timeout(),
    )
    .context("failed to build gateway HTTP client")?;
    let gateways = Arc::new(GatewayClientCache::new(Arc::new(connector)));

    let subscription_state = SubscriptionAppState {
        configs: configs.clone(),
        gateways,
        subscription_repository: Arc::new(PostgresSubscriptionRepository::new(pool)),
        environment: config.server.gateway_environment(),
    };
    let config_state = TenantConfigAppState::new(configs);

    let app = api_router(subscription_state, config_state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        gateway_environment = %config.server.gateway_environment(),
        "autopay backend listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
