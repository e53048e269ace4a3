//! Security core error types.
//!
//! Only [`SecurityError::Validation`] and the two crypto variants are meant to
//! reach UI callers. Storage and transport failures are handled internally and
//! surface at most as "not authenticated" or a dropped log entry.

use thiserror::Error;

/// Input rejected by a validating sanitizer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Address is not of the form `local@domain.tld`.
    #[error("Invalid email format")]
    InvalidEmail,

    /// Not a dialable number after stripping formatting characters.
    #[error("Invalid phone number format")]
    InvalidPhone,

    /// Not an absolute http(s) URL.
    #[error("Invalid URL format")]
    InvalidUrl,
}

/// Errors reported by a [`KeyValueStore`](crate::ports::outbound::KeyValueStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backing store cannot be used at all (disabled, private mode).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Write rejected because the store is full.
    #[error("Storage quota exceeded")]
    QuotaExceeded,
}

/// Errors reported by an [`HttpTransport`](crate::ports::outbound::HttpTransport).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection, DNS or timeout failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-2xx status.
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// Body could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable held something that does not parse.
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: String, value: String },

    /// A limit that must be positive was zero.
    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    /// The HTTP client for the audit and log sinks could not be built.
    #[error("HTTP client unavailable: {0}")]
    HttpClient(String),
}

/// Errors surfaced by the security core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecurityError {
    /// Input validation failed; recoverable by re-prompting the user.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Encryption could not be performed.
    #[error("Failed to encrypt data")]
    EncryptionFailed,

    /// Ciphertext, payload or key was rejected. Never carries the cause.
    #[error("Failed to decrypt data")]
    DecryptionFailed,

    /// Session storage cannot be written.
    #[error("Session storage unavailable")]
    StorageUnavailable,

    /// Configuration was rejected.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl From<StorageError> for SecurityError {
    fn from(_: StorageError) -> Self {
        SecurityError::StorageUnavailable
    }
}

/// Result alias for the security core.
pub type SecurityResult<T> = Result<T, SecurityError>;
