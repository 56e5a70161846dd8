//! Credential encryption adapters.

mod aes_gcm_codec;

pub use aes_gcm_codec::AesGcmSecretCodec;
