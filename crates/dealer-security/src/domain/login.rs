//! Consecutive login failure tracking.

/// Result of checking an account before a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginDecision {
    /// Attempt may proceed; `remaining` failures are left before lockout.
    Allowed { remaining: u32 },
    /// Account is locked until the given epoch ms.
    LockedOut { until_epoch_ms: i64 },
}

impl LoginDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, LoginDecision::Allowed { .. })
    }
}

/// Failure count for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttemptRecord {
    pub failures: u32,
    pub locked_until_epoch_ms: Option<i64>,
}

impl AttemptRecord {
    /// Record a failure. Returns true if this failure triggered the lockout.
    pub fn record_failure(&mut self, now_ms: i64, max_attempts: u32, lockout_ms: u64) -> bool {
        self.expire_lock(now_ms);
        self.failures = self.failures.saturating_add(1);
        if self.failures >= max_attempts && self.locked_until_epoch_ms.is_none() {
            self.locked_until_epoch_ms = Some(now_ms.saturating_add(lockout_ms as i64));
            return true;
        }
        false
    }

    /// Lockouts lapse lazily; an expired one resets the counter.
    pub fn expire_lock(&mut self, now_ms: i64) {
        if let Some(until) = self.locked_until_epoch_ms {
            if now_ms >= until {
                *self = AttemptRecord::default();
            }
        }
    }

    pub fn decision(&self, now_ms: i64, max_attempts: u32) -> LoginDecision {
        match self.locked_until_epoch_ms {
            Some(until) if now_ms < until => LoginDecision::LockedOut {
                until_epoch_ms: until,
            },
            Some(_) => LoginDecision::Allowed {
                remaining: max_attempts,
            },
            None => LoginDecision::Allowed {
                remaining: max_attempts.saturating_sub(self.failures),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lockout_after_max_failures() {
        let mut record = AttemptRecord::default();
        for _ in 0..4 {
            assert!(!record.record_failure(0, 5, 1_000));
        }
        assert_eq!(record.decision(0, 5), LoginDecision::Allowed { remaining: 1 });
        assert!(record.record_failure(0, 5, 1_000));
        assert_eq!(
            record.decision(10, 5),
            LoginDecision::LockedOut { until_epoch_ms: 1_000 }
        );
        // Further failures while locked do not re-trigger.
        assert!(!record.record_failure(20, 5, 1_000));
    }

    #[test]
    fn test_lockout_lapses() {
        let mut record = AttemptRecord::default();
        record.record_failure(0, 1, 500);
        assert!(!record.decision(499, 1).is_allowed());
        assert!(record.decision(500, 1).is_allowed());

        record.expire_lock(500);
        assert_eq!(record, AttemptRecord::default());
    }
}
