//! # Dealer Security - Client Security Core
//!
//! Security utilities for the dealership management dashboard: credential
//! lifecycle, idle-session timeout, request rate limiting, certificate
//! pinning, local encryption of sensitive values, audit and secure logging,
//! and input sanitization.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                  SecurityCore (security_core.rs)                 │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  SessionMonitor ──► TokenStore        RateLimiter                │
//! │        │                              CertificateValidator       │
//! │        ▼                              DataCipher                 │
//! │   AuditTrail    SecureLog             LoginAttemptGuard          │
//! │        │            │                 CspManager                 │
//! │        └──── Dispatcher (fire-and-forget) ───┐                   │
//! │                                              │                   │
//! │  SecurityContext: one config snapshot, read by every component   │
//! ├──────────────────────────────────────────────┴───────────────────┤
//! │  Ports: Clock · KeyValueStore · HttpTransport · ActivitySource   │
//! │         Navigator · Cipher                                       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `domain::sanitize` holds the stateless input sanitizers.
//!
//! ## Failure Model
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Invalid email/phone/URL | `ValidationError` returned to the caller |
//! | Encrypt/decrypt failure | `EncryptionFailed` / `DecryptionFailed`, no detail |
//! | Session storage unavailable | Treated as signed out |
//! | Audit/log delivery failure | Counted and logged, never surfaced |
//! | No pinned fingerprints | Accept (fail-open) unless configured fail-closed |
//!
//! Certificate pinning here is a best-effort check on fingerprints reported
//! by the host. It does not replace TLS certificate verification.

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod security_core;
pub mod service;

pub use security_core::{SecurityCore, SecurityCoreBuilder};
pub use domain::{
    actions, AuditEvent, ConfigError, EndReason, Environment, LogEntry, LogLevel, LoginDecision,
    PinningMode, SecurityConfig, SecurityConfigOverrides, SecurityError, SecurityResult,
    SessionPhase, StorageKey, UserAction, ValidationError,
};
pub use domain::sanitize::{
    sanitize_email, sanitize_file_name, sanitize_html, sanitize_javascript, sanitize_phone,
    sanitize_sql, sanitize_url,
};
pub use service::{
    decrypt_with_key, AuditTrail, CertificateValidator, CspManager, DataCipher, LoginAttemptGuard,
    RateLimiter, SecureLog, SecurityContext, SessionMonitor, TokenStore,
};
pub use shared_crypto::EncryptedPayload;
