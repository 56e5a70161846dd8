//! HMAC-SHA256 signature checks for payment callbacks and webhooks.
//!
//! Both checks compare lowercase hex digests in constant time. The
//! expected digest never leaves this module.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Hex HMAC-SHA256 of `message` keyed by `secret`.
pub fn compute_signature(secret: &[u8], message: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).expect("HMAC accepts any key");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `signature` against the HMAC of `message`.
///
/// Deterministic and side-effect free. Any change to the signature text,
/// including letter case, fails verification.
pub fn verify_signature(message: &[u8], signature: &str, secret: &[u8]) -> bool {
    let expected = compute_signature(secret, message);
    constant_time_compare(expected.as_bytes(), signature.as_bytes())
}

/// Message signed by the gateway after a successful mandate payment.
pub fn payment_message(payment_id: &str, gateway_subscription_id: &str) -> String {
    format!("{}|{}", payment_id, gateway_subscription_id)
}

/// Verifies the checkout callback signature with the tenant's key secret.
pub fn verify_payment_signature(
    payment_id: &str,
    gateway_subscription_id: &str,
    signature: &str,
    key_secret: &SecretString,
) -> bool {
    let message = payment_message(payment_id, gateway_subscription_id);
    verify_signature(
        message.as_bytes(),
        signature,
        key_secret.expose_secret().as_bytes(),
    )
}

/// Verifies a webhook body with the tenant's webhook secret.
pub fn verify_webhook_signature(body: &[u8], signature: &str, webhook_secret: &SecretString) -> bool {
    verify_signature(body, signature, webhook_secret.expose_secret().as_bytes())
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
