//! # Shared Crypto - Symmetric Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `symmetric` | AES-256-GCM | Encrypting sensitive values held on the client |
//!
//! ## Security Properties
//!
//! - **AES-256-GCM**: AEAD, any tampering with IV or ciphertext fails decryption
//! - **Fresh IV per call**: 96-bit random IV generated inside `encrypt`
//! - **Zeroized keys**: `SecretKey` wipes its bytes on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod symmetric;

// Re-exports
pub use errors::CryptoError;
pub use symmetric::{decrypt, encrypt, EncryptedPayload, Iv, SecretKey, IV_LEN, KEY_LEN};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
