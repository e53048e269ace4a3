//! # Outbound Ports (Driven Ports)
//!
//! Capabilities the security core needs from its host: time, session-scoped
//! storage, HTTP delivery, user-activity notifications, navigation and
//! symmetric cryptography.
//!
//! Production adapters and in-memory test adapters live in `crate::adapters`.

use async_trait::async_trait;
use serde_json::Value;
use shared_crypto::{CryptoError, EncryptedPayload};
use std::sync::Arc;

use crate::domain::errors::{StorageError, TransportError};
use crate::domain::keys::StorageKey;
use crate::domain::session::{ActivityKind, EndReason, ListenerOptions};

/// Wall-clock time source.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// Session-scoped key-value storage.
///
/// Cleared when the browsing session ends. Every slot is a [`StorageKey`];
/// components never invent their own key strings.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
}

/// JSON-over-HTTP delivery for audit and log entries.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `body` to `url`. Non-2xx answers are reported as [`TransportError::Status`].
    async fn post_json(&self, url: &str, body: &Value) -> Result<(), TransportError>;
}

/// Opaque registration handle returned by an [`ActivitySource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked on user activity.
pub type ActivityHandler = Arc<dyn Fn(ActivityKind) + Send + Sync>;

/// Source of pointer, keyboard and touch activity.
pub trait ActivitySource: Send + Sync {
    fn register(
        &self,
        kinds: &[ActivityKind],
        options: ListenerOptions,
        handler: ActivityHandler,
    ) -> ListenerId;

    fn unregister(&self, id: ListenerId);
}

/// Navigation back to the unauthenticated entry point.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self, reason: EndReason);
}

/// Authenticated symmetric encryption.
///
/// Async because platform crypto APIs are non-blocking.
#[async_trait]
pub trait Cipher: Send + Sync {
    async fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedPayload, CryptoError>;

    async fn decrypt(&self, payload: &EncryptedPayload) -> Result<Vec<u8>, CryptoError>;

    /// Hex encoding of the key, for callers that persist it themselves.
    fn export_key(&self) -> String;
}
