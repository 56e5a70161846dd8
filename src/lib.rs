//! Autopay Backend - multi-tenant recurring payments over UPI Autopay.
//!
//! Tenants register gateway credentials, create subscription checkouts,
//! verify checkout callbacks and receive gateway webhooks that keep the
//! local subscription records in step with the gateway.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
