//! Per-identifier fixed-window rate limiting.
//!
//! Limits are read from the live configuration on every call, so
//! `update_config` takes effect immediately. Window state is process memory
//! only and resets on restart. Expired windows are pruned whenever a new one
//! is opened.

use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::warn;

use dealer_telemetry::RATE_LIMIT_REJECTIONS;

use crate::domain::rate_limit::{metric_scope, RateWindow};
use crate::service::context::SecurityContext;

#[derive(Debug)]
pub struct RateLimiter {
    context: SecurityContext,
    windows: Mutex<HashMap<String, RateWindow>>,
}

impl RateLimiter {
    pub fn new(context: SecurityContext) -> Self {
        Self {
            context,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count a request for `identifier` and report whether it is allowed.
    pub fn is_allowed(&self, identifier: &str) -> bool {
        let config = self.context.config();
        let now = self.context.now_ms();

        let count = {
            let mut windows = self.windows.lock();
            match windows.get_mut(identifier) {
                Some(window) if !window.is_expired(now, config.rate_limit_window_ms) => {
                    if window.admit(config.rate_limit_max_requests) {
                        return true;
                    }
                    window.count
                }
                _ => {
                    let window_ms = config.rate_limit_window_ms;
                    windows.retain(|_, w| !w.is_expired(now, window_ms));
                    windows.insert(identifier.to_string(), RateWindow::open(now));
                    return true;
                }
            }
        };

        let scope = metric_scope(identifier);
        RATE_LIMIT_REJECTIONS.with_label_values(&[scope.as_str()]).inc();
        warn!(
            identifier,
            count,
            max = config.rate_limit_max_requests,
            "Rate limit exceeded"
        );
        false
    }

    /// Requests left in the current window; the full limit for an unseen
    /// identifier or an elapsed window.
    pub fn remaining_requests(&self, identifier: &str) -> u32 {
        let config = self.context.config();
        let now = self.context.now_ms();
        match self.windows.lock().get(identifier) {
            Some(window) if !window.is_expired(now, config.rate_limit_window_ms) => {
                window.remaining(config.rate_limit_max_requests)
            }
            _ => config.rate_limit_max_requests,
        }
    }

    /// Milliseconds until the current window for `identifier` closes.
    pub fn reset_in_ms(&self, identifier: &str) -> Option<u64> {
        let config = self.context.config();
        let now = self.context.now_ms();
        self.windows
            .lock()
            .get(identifier)
            .filter(|w| !w.is_expired(now, config.rate_limit_window_ms))
            .map(|w| w.resets_at(config.rate_limit_window_ms).saturating_sub(now).max(0) as u64)
    }

    /// Forget `identifier`. Administrative use only.
    pub fn clear(&self, identifier: &str) {
        self.windows.lock().remove(identifier);
    }

    /// Forget every identifier. Administrative use only.
    pub fn clear_all(&self) {
        self.windows.lock().clear();
    }

    pub fn tracked_identifiers(&self) -> usize {
        self.windows.lock().len()
    }
}
