//! # Symmetric Encryption
//!
//! AES-256-GCM authenticated encryption for values kept on the client.
//!
//! ## Security Properties
//!
//! - **AES-256-GCM**: 256-bit key, 96-bit IV, 128-bit authentication tag
//! - Every call to [`encrypt`] draws a fresh random IV from the OS-seeded
//!   thread RNG, so a key+IV pair is never reused by this module
//! - Decryption verifies the tag before returning any plaintext

use crate::CryptoError;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as GcmNonce,
};
use std::fmt;
use zeroize::Zeroize;

/// Key length in bytes.
pub const KEY_LEN: usize = 32;

/// IV length in bytes (GCM standard nonce).
pub const IV_LEN: usize = 12;

/// Separator between the IV and ciphertext in the encoded form.
const PAYLOAD_SEPARATOR: char = ':';

/// Secret key (256-bit).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Export as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Import from hex.
    ///
    /// # Errors
    ///
    /// `MalformedPayload` for non-hex input, `InvalidKeyLength` for
    /// anything other than 32 decoded bytes.
    pub fn from_hex(encoded: &str) -> Result<Self, CryptoError> {
        let mut raw = hex::decode(encoded.trim())
            .map_err(|e| CryptoError::MalformedPayload(format!("key: {}", e)))?;
        if raw.len() != KEY_LEN {
            let actual = raw.len();
            raw.zeroize();
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                actual,
            });
        }
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&raw);
        raw.zeroize();
        Ok(Self(bytes))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// Initialization vector for AES-GCM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Iv([u8; IV_LEN]);

impl Iv {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; IV_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate random IV.
    pub fn generate() -> Self {
        let mut bytes = [0u8; IV_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; IV_LEN] {
        &self.0
    }

    fn from_slice(raw: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; IV_LEN] = raw.try_into().map_err(|_| CryptoError::InvalidIvLength {
            expected: IV_LEN,
            actual: raw.len(),
        })?;
        Ok(Self(bytes))
    }
}

/// IV plus authenticated ciphertext (the GCM tag is appended to the ciphertext).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// IV used for this ciphertext
    pub iv: Iv,
    /// Ciphertext with trailing authentication tag
    pub ciphertext: Vec<u8>,
}

impl EncryptedPayload {
    /// Encode as `hex(iv):hex(ciphertext)` for storage or transport.
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            hex::encode(self.iv.as_bytes()),
            PAYLOAD_SEPARATOR,
            hex::encode(&self.ciphertext)
        )
    }

    /// Parse the form produced by [`EncryptedPayload::encode`].
    ///
    /// # Errors
    ///
    /// Returns `MalformedPayload` or `InvalidIvLength` if the input is not a
    /// well-formed payload. Authenticity is only checked by [`decrypt`].
    pub fn decode(encoded: &str) -> Result<Self, CryptoError> {
        let (iv_hex, ct_hex) = encoded
            .trim()
            .split_once(PAYLOAD_SEPARATOR)
            .ok_or_else(|| CryptoError::MalformedPayload("missing separator".into()))?;

        let iv_raw =
            hex::decode(iv_hex).map_err(|e| CryptoError::MalformedPayload(format!("iv: {}", e)))?;
        let ciphertext = hex::decode(ct_hex)
            .map_err(|e| CryptoError::MalformedPayload(format!("ciphertext: {}", e)))?;

        Ok(Self {
            iv: Iv::from_slice(&iv_raw)?,
            ciphertext,
        })
    }
}

/// Encrypt plaintext with AES-256-GCM under a fresh random IV.
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if encryption fails.
pub fn encrypt(key: &SecretKey, plaintext: &[u8]) -> Result<EncryptedPayload, CryptoError> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let iv = Iv::generate();

    let ciphertext = cipher
        .encrypt(GcmNonce::from_slice(iv.as_bytes()), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok(EncryptedPayload { iv, ciphertext })
}

/// Decrypt and authenticate a payload with AES-256-GCM.
///
/// # Errors
///
/// Returns `CryptoError::DecryptionFailed` on any tag mismatch.
pub fn decrypt(key: &SecretKey, payload: &EncryptedPayload) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    cipher
        .decrypt(GcmNonce::from_slice(payload.iv.as_bytes()), payload.ciphertext.as_slice())
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}
