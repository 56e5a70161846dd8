//! AES-GCM implementation of the `SecretCodec` port.
//!
//! Output format: base64 (standard alphabet) of `nonce || ciphertext || tag`,
//! with a fresh 96-bit random nonce per call. The key length picks the
//! variant: 16 bytes for AES-128, 24 for AES-192, 32 for AES-256.

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, Nonce, OsRng};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};

use crate::ports::{CipherError, SecretCodec};

type Aes192Gcm = AesGcm<Aes192, U12>;

const NONCE_LEN: usize = 12;

enum Cipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

/// Process-wide credential cipher.
pub struct AesGcmSecretCodec {
    cipher: Cipher,
}

impl AesGcmSecretCodec {
    /// Builds the codec from raw key bytes.
    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        let cipher = match key.len() {
            16 => Cipher::Aes128(
                Aes128Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength(16))?,
            ),
            24 => Cipher::Aes192(
                Aes192Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength(24))?,
            ),
            32 => Cipher::Aes256(
                Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength(32))?,
            ),
            other => return Err(CipherError::InvalidKeyLength(other)),
        };
        Ok(Self { cipher })
    }

    /// Builds the codec from the configured key string (its UTF-8 bytes are the key).
    pub fn from_secret(key: &SecretString) -> Result<Self, CipherError> {
        Self::new(key.expose_secret().as_bytes())
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        match &self.cipher {
            Cipher::Aes128(c) => seal_with(c, plaintext),
            Cipher::Aes192(c) => seal_with(c, plaintext),
            Cipher::Aes256(c) => seal_with(c, plaintext),
        }
    }

    fn open(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        match &self.cipher {
            Cipher::Aes128(c) => open_with(c, data),
            Cipher::Aes192(c) => open_with(c, data),
            Cipher::Aes256(c) => open_with(c, data),
        }
    }
}

fn seal_with<C>(cipher: &C, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>
where
    C: Aead + AeadCore<NonceSize = U12>,
{
    let nonce = C::generate_nonce(&mut OsRng);
    let sealed = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| CipherError::EncryptionFailed)?;

    let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&sealed);
    Ok(out)
}

fn open_with<C>(cipher: &C, data: &[u8]) -> Result<Vec<u8>, CipherError>
where
    C: Aead + AeadCore<NonceSize = U12>,
{
    if data.len() < NONCE_LEN {
        return Err(CipherError::CorruptCiphertext("ciphertext too short"));
    }
    let (nonce, sealed) = data.split_at(NONCE_LEN);
    cipher
        .decrypt(Nonce::<C>::from_slice(nonce), sealed)
        .map_err(|_| CipherError::CorruptCiphertext("authentication failed"))
}

impl SecretCodec for AesGcmSecretCodec {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        let sealed = self.seal(plaintext.as_bytes())?;
        Ok(STANDARD.encode(sealed))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        if ciphertext.is_empty() {
            return Ok(String::new());
        }
        let data = STANDARD
            .decode(ciphertext)
            .map_err(|_| CipherError::CorruptCiphertext("invalid base64"))?;
        let plaintext = self.open(&data)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::CorruptCiphertext("invalid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_32: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    fn codec() -> AesGcmSecretCodec {
        AesGcmSecretCodec::new(KEY_32).unwrap()
    }

    #[test]
    fn accepts_all_aes_key_sizes() {
        assert!(AesGcmSecretCodec::new(&[7u8; 16]).is_ok());
        assert!(AesGcmSecretCodec::new(&[7u8; 24]).is_ok());
        assert!(AesGcmSecretCodec::new(&[7u8; 32]).is_ok());
    }

    #[test]
    fn rejects_other_key_sizes() {
        assert_eq!(
            AesGcmSecretCodec::new(&[7u8; 20]).err(),
            Some(CipherError::InvalidKeyLength(20))
        );
    }

    #[test]
    fn decrypt_recovers_plaintext_for_each_variant() {
        for key in [&[1u8; 16][..], &[2u8; 24][..], &[3u8; 32][..]] {
            let codec = AesGcmSecretCodec::new(key).unwrap();
            let sealed = codec.encrypt("rzp_test_secret").unwrap();
            assert_eq!(codec.decrypt(&sealed).unwrap(), "rzp_test_secret");
        }
    }

    #[test]
    fn each_encryption_uses_a_fresh_nonce() {
        let codec = codec();
        let a = codec.encrypt("same").unwrap();
        let b = codec.encrypt("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_maps_to_empty() {
        let codec = codec();
        assert_eq!(codec.encrypt("").unwrap(), "");
        assert_eq!(codec.decrypt("").unwrap(), "");
    }

    #[test]
    fn truncated_ciphertext_is_corrupt() {
        let short = STANDARD.encode([0u8; 5]);
        assert_eq!(
            codec().decrypt(&short),
            Err(CipherError::CorruptCiphertext("ciphertext too short"))
        );
    }

    #[test]
    fn tampered_ciphertext_is_corrupt() {
        let codec = codec();
        let sealed = codec.encrypt("secret").unwrap();
        let mut bytes = STANDARD.decode(&sealed).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;

        let result = codec.decrypt(&STANDARD.encode(bytes));
        assert!(matches!(result, Err(CipherError::CorruptCiphertext(_))));
    }

    #[test]
    fn wrong_key_is_corrupt() {
        let sealed = codec().encrypt("secret").unwrap();
        let other = AesGcmSecretCodec::new(&[9u8; 32]).unwrap();
        assert!(matches!(
            other.decrypt(&sealed),
            Err(CipherError::CorruptCiphertext(_))
        ));
    }

    #[test]
    fn non_base64_is_corrupt() {
        assert_eq!(
            codec().decrypt("%%%"),
            Err(CipherError::CorruptCiphertext("invalid base64"))
        );
    }
}
