//! Bearer credential with an absolute expiry.

use serde::{Deserialize, Serialize};

/// A bearer token as persisted by the token store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub value: String,
    pub expires_at_epoch_ms: i64,
}

impl Token {
    /// Token issued at `now_ms` that lives for `expires_in_secs`.
    ///
    /// A negative lifetime produces a token that is already expired.
    pub fn issue(value: impl Into<String>, expires_in_secs: i64, now_ms: i64) -> Self {
        Self {
            value: value.into(),
            expires_at_epoch_ms: now_ms.saturating_add(expires_in_secs.saturating_mul(1000)),
        }
    }

    /// Expired strictly after the expiry instant.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at_epoch_ms
    }

    /// Milliseconds until expiry, zero once expired.
    pub fn remaining_ms(&self, now_ms: i64) -> u64 {
        self.expires_at_epoch_ms.saturating_sub(now_ms).max(0) as u64
    }
}

// Never print credential material.
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"[REDACTED]")
            .field("expires_at_epoch_ms", &self.expires_at_epoch_ms)
            .finish()
    }
}
