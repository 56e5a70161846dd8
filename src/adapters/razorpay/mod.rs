//! Razorpay gateway adapters.

mod client;
mod mock_gateway;

pub use client::{RazorpayClient, RazorpayConnector, DEFAULT_BASE_URL};
pub use mock_gateway::{MethodCall, MockConnector, MockGateway};
