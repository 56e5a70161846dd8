//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - sqlx repositories
//! - `memory` - in-memory repositories for tests and local runs
//! - `crypto` - AES-GCM credential codec
//! - `razorpay` - gateway HTTP client, connector and mock
//! - `gateway_cache` - per-tenant gateway client cache
//! - `http` - axum routers

pub mod crypto;
pub mod gateway_cache;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod razorpay;

pub use gateway_cache::GatewayClientCache;
