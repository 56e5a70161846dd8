//! Secret codec port - authenticated encryption of stored credentials.

use crate::domain::tenant::TenantConfigError;
use thiserror::Error;

/// Encrypts and decrypts credential strings.
///
/// Empty input maps to empty output without touching the cipher.
pub trait SecretCodec: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("encryption key must be 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("corrupt ciphertext: {0}")]
    CorruptCiphertext(&'static str),

    #[error("encryption failed")]
    EncryptionFailed,
}

impl From<CipherError> for TenantConfigError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::CorruptCiphertext(_) => TenantConfigError::CorruptCiphertext(err.to_string()),
            CipherError::InvalidKeyLength(_) | CipherError::EncryptionFailed => {
                TenantConfigError::Encryption(err.to_string())
            }
        }
    }
}
