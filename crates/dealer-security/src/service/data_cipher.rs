//! Authenticated encryption of sensitive strings.
//!
//! Fails closed: a wrong key, tampered ciphertext, malformed payload or bad
//! key import all surface as [`SecurityError::DecryptionFailed`] with no
//! detail. The underlying cause is logged at debug level only.

use std::sync::Arc;
use tracing::debug;

use dealer_telemetry::DECRYPTION_FAILURES;
use shared_crypto::EncryptedPayload;

use crate::adapters::AesGcmCipher;
use crate::domain::errors::{SecurityError, SecurityResult};
use crate::ports::Cipher;

#[derive(Clone)]
pub struct DataCipher {
    cipher: Arc<dyn Cipher>,
}

impl DataCipher {
    pub fn new(cipher: Arc<dyn Cipher>) -> Self {
        Self { cipher }
    }

    /// Cipher with a fresh random key that lives only in this process.
    pub fn ephemeral() -> Self {
        Self::new(Arc::new(AesGcmCipher::generate()))
    }

    /// Cipher over a previously exported hex key.
    pub fn import_key(key_hex: &str) -> SecurityResult<Self> {
        let cipher = AesGcmCipher::from_hex(key_hex).map_err(|e| {
            debug!(error = %e, "Key import rejected");
            DECRYPTION_FAILURES.inc();
            SecurityError::DecryptionFailed
        })?;
        Ok(Self::new(Arc::new(cipher)))
    }

    /// Hex encoding of the key.
    pub fn export_key(&self) -> String {
        self.cipher.export_key()
    }

    pub async fn encrypt(&self, plaintext: &str) -> SecurityResult<EncryptedPayload> {
        self.cipher.encrypt(plaintext.as_bytes()).await.map_err(|e| {
            debug!(error = %e, "Encryption failed");
            SecurityError::EncryptionFailed
        })
    }

    /// Encrypt to the `hex(iv):hex(ciphertext)` storage form.
    pub async fn encrypt_to_string(&self, plaintext: &str) -> SecurityResult<String> {
        Ok(self.encrypt(plaintext).await?.encode())
    }

    pub async fn decrypt(&self, payload: &EncryptedPayload) -> SecurityResult<String> {
        let plaintext = self
            .cipher
            .decrypt(payload)
            .await
            .map_err(|e| fail_closed(&e))?;
        String::from_utf8(plaintext).map_err(|e| fail_closed(&e))
    }

    /// Decrypt the `hex(iv):hex(ciphertext)` storage form.
    pub async fn decrypt_str(&self, encoded: &str) -> SecurityResult<String> {
        let payload = EncryptedPayload::decode(encoded).map_err(|e| fail_closed(&e))?;
        self.decrypt(&payload).await
    }
}

/// One-shot decryption with an imported key.
pub async fn decrypt_with_key(key_hex: &str, encoded: &str) -> SecurityResult<String> {
    DataCipher::import_key(key_hex)?.decrypt_str(encoded).await
}

fn fail_closed(cause: &dyn std::fmt::Display) -> SecurityError {
    debug!(error = %cause, "Decryption failed");
    DECRYPTION_FAILURES.inc();
    SecurityError::DecryptionFailed
}

impl std::fmt::Debug for DataCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataCipher").finish_non_exhaustive()
    }
}
