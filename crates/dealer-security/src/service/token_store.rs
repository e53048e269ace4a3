//! Bearer credential lifecycle.
//!
//! The token and its absolute expiry live in two store slots. A read that
//! finds the token expired (or its expiry missing or unreadable) purges both
//! slots before answering, so a stale token is never returned.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::errors::{SecurityError, SecurityResult};
use crate::domain::keys::StorageKey;
use crate::domain::token::Token;
use crate::ports::{Clock, KeyValueStore};

#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    /// Serializes read-check-purge against writes.
    guard: Arc<Mutex<()>>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Persist `value` valid for `expires_in_secs` from now.
    ///
    /// Fails with [`SecurityError::StorageUnavailable`]; callers should treat
    /// that as "not authenticated". A half-written token is rolled back.
    pub fn set_token(&self, value: &str, expires_in_secs: i64) -> SecurityResult<()> {
        let token = Token::issue(value, expires_in_secs, self.clock.now_ms());
        let _lock = self.guard.lock();

        self.store.set(StorageKey::AuthToken, &token.value)?;
        if let Err(e) = self.store.set(
            StorageKey::AuthTokenExpires,
            &token.expires_at_epoch_ms.to_string(),
        ) {
            let _ = self.store.remove(StorageKey::AuthToken);
            warn!(error = %e, "Token expiry could not be stored, token discarded");
            return Err(SecurityError::StorageUnavailable);
        }

        debug!(expires_at = token.expires_at_epoch_ms, "Token stored");
        Ok(())
    }

    /// Current token value, or `None` if absent or expired.
    pub fn get_token(&self) -> Option<String> {
        self.current().map(|t| t.value)
    }

    /// Remove token, expiry and refresh token. Safe to call on an empty store.
    pub fn clear_token(&self) {
        let _lock = self.guard.lock();
        for key in StorageKey::CREDENTIALS {
            if let Err(e) = self.store.remove(key) {
                debug!(key = %key, error = %e, "Could not remove credential");
            }
        }
    }

    pub fn is_token_valid(&self) -> bool {
        self.current().is_some()
    }

    /// Absolute expiry of the current token.
    pub fn expires_at_ms(&self) -> Option<i64> {
        self.current().map(|t| t.expires_at_epoch_ms)
    }

    /// Milliseconds until the current token expires.
    pub fn time_remaining_ms(&self) -> Option<u64> {
        let now = self.clock.now_ms();
        self.current().map(|t| t.remaining_ms(now))
    }

    pub fn set_refresh_token(&self, value: &str) -> SecurityResult<()> {
        let _lock = self.guard.lock();
        self.store.set(StorageKey::RefreshToken, value)?;
        Ok(())
    }

    pub fn refresh_token(&self) -> Option<String> {
        match self.store.get(StorageKey::RefreshToken) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Refresh token unreadable");
                None
            }
        }
    }

    fn current(&self) -> Option<Token> {
        let _lock = self.guard.lock();
        let now = self.clock.now_ms();

        let value = match self.store.get(StorageKey::AuthToken) {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Token storage unavailable, treating as signed out");
                return None;
            }
        };

        let expires_at = self
            .store
            .get(StorageKey::AuthTokenExpires)
            .ok()
            .flatten()
            .and_then(|raw| raw.parse::<i64>().ok());

        match expires_at {
            Some(expires_at_epoch_ms) => {
                let token = Token {
                    value,
                    expires_at_epoch_ms,
                };
                if token.is_expired(now) {
                    debug!(expires_at = expires_at_epoch_ms, now, "Token expired, purging");
                    self.purge();
                    None
                } else {
                    Some(token)
                }
            }
            None => {
                warn!("Token without a readable expiry, purging");
                self.purge();
                None
            }
        }
    }

    fn purge(&self) {
        let _ = self.store.remove(StorageKey::AuthToken);
        let _ = self.store.remove(StorageKey::AuthTokenExpires);
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}
