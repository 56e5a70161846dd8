//! HTTP adapter for subscription endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{SubscriptionApiError, SubscriptionAppState, SIGNATURE_HEADER};
pub use routes::subscription_routes;
