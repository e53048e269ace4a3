//! Account lockout after repeated login failures.

use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use tracing::warn;

use crate::domain::audit::{actions, resources};
use crate::domain::login::{AttemptRecord, LoginDecision};
use crate::service::audit_trail::AuditTrail;
use crate::service::context::SecurityContext;

/// Tracks consecutive failures per account and locks the account for
/// `login_lockout_ms` once `max_login_attempts` is reached.
#[derive(Debug)]
pub struct LoginAttemptGuard {
    context: SecurityContext,
    audit: AuditTrail,
    records: Mutex<HashMap<String, AttemptRecord>>,
}

impl LoginAttemptGuard {
    pub fn new(context: SecurityContext, audit: AuditTrail) -> Self {
        Self {
            context,
            audit,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `account` may attempt to log in now.
    pub fn check(&self, account: &str) -> LoginDecision {
        let max = self.context.config().max_login_attempts;
        let now = self.context.now_ms();
        self.records
            .lock()
            .get(account)
            .map(|r| r.decision(now, max))
            .unwrap_or(LoginDecision::Allowed { remaining: max })
    }

    pub fn is_locked(&self, account: &str) -> bool {
        !self.check(account).is_allowed()
    }

    /// Record a failed attempt and return the resulting decision.
    pub fn record_failure(&self, account: &str) -> LoginDecision {
        let config = self.context.config();
        let now = self.context.now_ms();

        let (locked_now, decision) = {
            let mut records = self.records.lock();
            let record = records.entry(account.to_string()).or_default();
            let locked_now =
                record.record_failure(now, config.max_login_attempts, config.login_lockout_ms);
            (locked_now, record.decision(now, config.max_login_attempts))
        };

        if let (true, LoginDecision::LockedOut { until_epoch_ms }) = (locked_now, decision) {
            warn!(account, until_epoch_ms, "Account locked after repeated login failures");
            self.audit.log_security_event(
                actions::ACCOUNT_LOCKED,
                resources::AUTHENTICATION,
                false,
                Some(json!({
                    "account": account,
                    "attempts": config.max_login_attempts,
                    "lockedUntil": until_epoch_ms,
                })),
            );
        }
        decision
    }

    /// Reset the failure count after a successful login.
    pub fn record_success(&self, account: &str) {
        self.records.lock().remove(account);
    }
}
