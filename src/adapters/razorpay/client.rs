//! Razorpay REST client.
//!
//! One [`RazorpayClient`] is bound to one tenant's API key pair. Clients
//! built by the same [`RazorpayConnector`] share a connection pool.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::domain::tenant::GatewayCredentials;
use crate::ports::{
    CancelOptions, CreateSubscriptionRequest, GatewayConnector, GatewayError, GatewayErrorCode,
    GatewayPlan, GatewaySubscription, PaymentGateway,
};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

/// Razorpay subscription API client for a single tenant.
pub struct RazorpayClient {
    http_client: reqwest::Client,
    base_url: String,
    key_id: SecretString,
    key_secret: SecretString,
}

impl RazorpayClient {
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        credentials: &GatewayCredentials,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key_id: credentials.key_id().clone(),
            key_secret: credentials.key_secret().clone(),
        }
    }

    /// Builds `{base}/v1/{segments...}`, percent-encoding each segment.
    ///
    /// Ids come from callers, so `/`, `.` and `..` can never change the
    /// endpoint the tenant's credentials are sent to.
    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.trim().is_empty() || **s == "." || **s == "..")
        {
            return Err(GatewayError::invalid_request(format!(
                "invalid resource id '{}'",
                bad
            )));
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| {
            GatewayError::new(
                GatewayErrorCode::InvalidRequest,
                format!("invalid gateway base URL: {}", e),
            )
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::new(
                    GatewayErrorCode::InvalidRequest,
                    "gateway base URL cannot carry a path",
                )
            })?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    /// Sends an authenticated request and decodes the success body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<T, GatewayError> {
        let response = request
            .basic_auth(
                self.key_id.expose_secret(),
                Some(self.key_secret.expose_secret()),
            )
            .send()
            .await
            .map_err(|e| GatewayError::network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let error = error_from_response(status, &error_text);
            tracing::error!(
                operation,
                status = status.as_u16(),
                provider_code = ?error.provider_code,
                "Razorpay API error: {}",
                error.message
            );
            return Err(error);
        }

        response.json::<T>().await.map_err(|e| {
            GatewayError::new(
                GatewayErrorCode::InvalidResponse,
                format!("failed to decode {} response: {}", operation, e),
            )
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_subscription(
        &self,
        request: &CreateSubscriptionRequest,
    ) -> Result<GatewaySubscription, GatewayError> {
        let builder = self
            .http_client
            .post(self.url(&["subscriptions"])?)
            .json(request);
        self.send(builder, "create_subscription").await
    }

    async fn fetch_plan(&self, plan_id: &str) -> Result<GatewayPlan, GatewayError> {
        let builder = self.http_client.get(self.url(&["plans", plan_id])?);
        self.send(builder, "fetch_plan").await
    }

    async fn fetch_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<GatewaySubscription, GatewayError> {
        let builder = self
            .http_client
            .get(self.url(&["subscriptions", subscription_id])?);
        self.send(builder, "fetch_subscription").await
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        options: CancelOptions,
    ) -> Result<GatewaySubscription, GatewayError> {
        let body = json!({ "cancel_at_cycle_end": u8::from(options.at_cycle_end) });
        let builder = self
            .http_client
            .post(self.url(&["subscriptions", subscription_id, "cancel"])?)
            .json(&body);
        self.send(builder, "cancel_subscription").await
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Maps a non-2xx response to a [`GatewayError`].
fn error_from_response(status: StatusCode, body: &str) -> GatewayError {
    let code = match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => GatewayErrorCode::InvalidRequest,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayErrorCode::Authentication,
        StatusCode::NOT_FOUND => GatewayErrorCode::NotFound,
        StatusCode::TOO_MANY_REQUESTS => GatewayErrorCode::RateLimited,
        s if s.is_server_error() => GatewayErrorCode::Upstream,
        _ => GatewayErrorCode::InvalidRequest,
    };

    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let message = envelope
                .error
                .description
                .unwrap_or_else(|| format!("gateway returned {}", status.as_u16()));
            let error = GatewayError::new(code, message);
            match envelope.error.code {
                Some(provider_code) => error.with_provider_code(provider_code),
                None => error,
            }
        }
        Err(_) => GatewayError::new(code, format!("gateway returned {}", status.as_u16())),
    }
}

/// Builds [`RazorpayClient`]s over one shared HTTP connection pool.
pub struct RazorpayConnector {
    http_client: reqwest::Client,
    base_url: String,
}

impl RazorpayConnector {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }
}

impl GatewayConnector for RazorpayConnector {
    fn connect(
        &self,
        credentials: &GatewayCredentials,
    ) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
        Ok(Arc::new(RazorpayClient::new(
            self.http_client.clone(),
            self.base_url.clone(),
            credentials,
        )))
    }
}
