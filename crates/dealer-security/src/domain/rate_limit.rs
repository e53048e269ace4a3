//! Fixed-window counter.
//!
//! Windows are not sliding. A burst that straddles a window boundary can be
//! admitted up to twice the limit; that is accepted in exchange for O(1)
//! state per identifier.

/// Request count for one identifier within the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub count: u32,
    pub window_start_epoch_ms: i64,
}

impl RateWindow {
    /// New window opened by its first request.
    pub fn open(now_ms: i64) -> Self {
        Self {
            count: 1,
            window_start_epoch_ms: now_ms,
        }
    }

    /// The window has ended once `window_ms` have elapsed since it opened.
    pub fn is_expired(&self, now_ms: i64, window_ms: u64) -> bool {
        now_ms.saturating_sub(self.window_start_epoch_ms) >= window_ms as i64
    }

    /// Count one more request. Returns whether it is within `max`.
    pub fn admit(&mut self, max: u32) -> bool {
        self.count = self.count.saturating_add(1);
        self.count <= max
    }

    pub fn remaining(&self, max: u32) -> u32 {
        max.saturating_sub(self.count)
    }

    /// Epoch ms at which this window closes.
    pub fn resets_at(&self, window_ms: u64) -> i64 {
        self.window_start_epoch_ms.saturating_add(window_ms as i64)
    }
}

/// Metric label for an identifier, drawn from a bounded set.
///
/// Endpoints keep their first two path segments with numeric segments folded
/// to `:id` (`/api/deals/42` is `/api/deals`, `/api/42` is `/api/:id`).
/// Anything that is not a path is `other`.
pub fn metric_scope(identifier: &str) -> String {
    let path = identifier.split(['?', '#']).next().unwrap_or_default();
    if !path.starts_with('/') {
        return "other".to_string();
    }
    let segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .take(2)
        .map(|s| {
            if s.chars().all(|c| c.is_ascii_digit()) {
                ":id"
            } else {
                s
            }
        })
        .collect();
    format!("/{}", segments.join("/"))
}
