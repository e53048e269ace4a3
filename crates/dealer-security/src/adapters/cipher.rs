//! AES-256-GCM cipher adapter.

use async_trait::async_trait;
use shared_crypto::{CryptoError, EncryptedPayload, SecretKey};

use crate::ports::Cipher;

/// Cipher over a single AES-256-GCM key. Each call draws a fresh IV.
#[derive(Debug)]
pub struct AesGcmCipher {
    key: SecretKey,
}

impl AesGcmCipher {
    /// Cipher with a newly generated random key.
    pub fn generate() -> Self {
        Self {
            key: SecretKey::generate(),
        }
    }

    pub fn with_key(key: SecretKey) -> Self {
        Self { key }
    }

    /// Import a hex-encoded 256-bit key.
    pub fn from_hex(key_hex: &str) -> Result<Self, CryptoError> {
        SecretKey::from_hex(key_hex).map(Self::with_key)
    }
}

#[async_trait]
impl Cipher for AesGcmCipher {
    async fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedPayload, CryptoError> {
        shared_crypto::encrypt(&self.key, plaintext)
    }

    async fn decrypt(&self, payload: &EncryptedPayload) -> Result<Vec<u8>, CryptoError> {
        shared_crypto::decrypt(&self.key, payload)
    }

    fn export_key(&self) -> String {
        self.key.to_hex()
    }
}
