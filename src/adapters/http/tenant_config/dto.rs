//! HTTP DTOs for tenant config endpoints.
//!
//! Secrets arrive as `SecretString` and never appear in any response.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{Page, Timestamp};
use crate::domain::tenant::{GatewayEnvironment, TenantConfig, TenantConfigChanges};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /configs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTenantConfigRequest {
    pub app_name: String,
    pub environment: String,
    pub razorpay_key_id: Option<SecretString>,
    pub razorpay_key_secret: Option<SecretString>,
    pub razorpay_webhook_secret: Option<SecretString>,
    pub is_active: Option<bool>,
    pub metadata: Option<Map<String, Value>>,
}

/// Body of `PUT /configs/:id`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTenantConfigRequest {
    pub razorpay_key_id: Option<SecretString>,
    pub razorpay_key_secret: Option<SecretString>,
    pub razorpay_webhook_secret: Option<SecretString>,
    pub is_active: Option<bool>,
    pub metadata: Option<Map<String, Value>>,
}

impl From<UpdateTenantConfigRequest> for TenantConfigChanges {
    fn from(request: UpdateTenantConfigRequest) -> Self {
        Self {
            key_id: request.razorpay_key_id,
            key_secret: request.razorpay_key_secret,
            webhook_secret: request.razorpay_webhook_secret,
            is_active: request.is_active,
            metadata: request.metadata,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ByAppQuery {
    pub app_name: String,
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListTenantConfigsParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub active_only: bool,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Public view of a tenant config.
#[derive(Debug, Clone, Serialize)]
pub struct TenantConfigResponse {
    pub id: String,
    pub app_name: String,
    pub environment: GatewayEnvironment,
    pub is_active: bool,
    pub metadata: Map<String, Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TenantConfig> for TenantConfigResponse {
    fn from(config: TenantConfig) -> Self {
        Self {
            id: config.id.to_string(),
            app_name: config.tenant.app_name().to_string(),
            environment: config.tenant.environment(),
            is_active: config.is_active,
            metadata: config.metadata,
            created_at: config.created_at,
            updated_at: config.updated_at,
        }
    }
}

pub type TenantConfigPage = Page<TenantConfigResponse>;

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
