//! # Session Flows
//!
//! Login stores the credential and starts the idle monitor; logout or an
//! idle timeout clears it and returns to the login page. Only start and end
//! transitions are audited.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dealer_security::ports::KeyValueStore;
    use dealer_security::{
        EndReason, SecurityConfigOverrides, SecurityError, SessionPhase, StorageKey,
    };
    use serde_json::json;

    use crate::integration::harness::{TestCore, START_MS};

    const TIMEOUT_MS: u64 = 5 * 60 * 1000;

    fn short_timeout() -> SecurityConfigOverrides {
        SecurityConfigOverrides {
            session_timeout_ms: Some(TIMEOUT_MS),
            ..Default::default()
        }
    }

    // =============================================================================
    // EXPLICIT LOGOUT
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_logout_clears_tokens_and_audits_once() {
        let h = TestCore::new(short_timeout());
        h.core.on_login("dana@example.com", "bearer-abc", 3600).unwrap();
        h.store
            .set(StorageKey::UserData, &json!({"id": "u-17"}).to_string())
            .unwrap();
        h.store.set(StorageKey::DashboardPreferences, "{}").unwrap();
        h.core.tokens().set_refresh_token("refresh-xyz").unwrap();

        // Plenty of activity while signed in.
        for _ in 0..25 {
            h.activity.emit(dealer_security::domain::ActivityKind::MouseMove);
        }

        h.core.session().end_session();
        h.core.session().end_session();
        h.settle().await;

        assert_eq!(h.core.tokens().get_token(), None);
        assert_eq!(h.core.tokens().refresh_token(), None);
        assert!(!h.store.contains(StorageKey::UserData));
        assert!(!h.store.contains(StorageKey::DashboardPreferences));
        assert_eq!(h.navigator.redirects(), vec![EndReason::Logout]);

        assert_eq!(h.audit_count("SESSION_STARTED"), 1);
        assert_eq!(h.audit_count("SESSION_ENDED"), 1);

        let ended = h
            .audit_bodies()
            .into_iter()
            .find(|b| b["action"] == "SESSION_ENDED")
            .unwrap();
        assert_eq!(ended["resource"], "session");
        assert_eq!(ended["userId"], "u-17");
        assert_eq!(ended["sessionId"], h.core.context().session_id());
    }

    // =============================================================================
    // IDLE TIMEOUT
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_expires() {
        let h = TestCore::new(short_timeout());
        h.core.on_login("dana@example.com", "bearer-abc", 3600).unwrap();

        tokio::time::sleep(Duration::from_millis(TIMEOUT_MS + 10)).await;
        h.settle().await;

        assert_eq!(h.core.session().phase(), SessionPhase::Expired);
        assert!(!h.core.tokens().is_token_valid());
        assert_eq!(h.navigator.redirects(), vec![EndReason::IdleTimeout]);
        assert_eq!(h.audit_count("SESSION_EXPIRED"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_steady_activity_keeps_session_alive() {
        let h = TestCore::new(short_timeout());
        h.core.on_login("dana@example.com", "bearer-abc", 3600).unwrap();

        // Activity every minute for twenty minutes.
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_secs(60)).await;
            h.clock.advance(60_000);
            h.activity.emit(dealer_security::domain::ActivityKind::KeyPress);
        }
        h.settle().await;

        assert!(h.core.session().is_active());
        assert_eq!(h.core.tokens().get_token().as_deref(), Some("bearer-abc"));
        assert_eq!(h.audit_count("SESSION_EXPIRED"), 0);
        assert_eq!(
            h.core.session().last_activity_ms(),
            Some(START_MS + 20 * 60_000)
        );
    }

    // =============================================================================
    // TOKEN EXPIRY
    // =============================================================================

    #[tokio::test]
    async fn test_token_lifetime() {
        let h = TestCore::with_defaults();
        h.core.tokens().set_token("t", 3600).unwrap();
        assert_eq!(h.core.tokens().get_token().as_deref(), Some("t"));

        h.core.tokens().set_token("t", -1).unwrap();
        assert_eq!(h.core.tokens().get_token(), None);
        assert!(!h.store.contains(StorageKey::AuthToken));
        assert!(!h.store.contains(StorageKey::AuthTokenExpires));
    }

    #[tokio::test]
    async fn test_token_expires_with_clock() {
        let h = TestCore::with_defaults();
        h.core.tokens().set_token("t", 60).unwrap();
        h.clock.advance(60_001);
        assert!(!h.core.tokens().is_token_valid());
        assert!(h.store.get(StorageKey::AuthToken).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_with_unavailable_storage() {
        let h = TestCore::with_defaults();
        h.store.set_available(false);
        let result = h.core.on_login("dana@example.com", "bearer", 3600);
        assert_eq!(result, Err(SecurityError::StorageUnavailable));
        assert!(!h.core.session().is_active());
        assert!(!h.core.tokens().is_token_valid());
    }

    #[test]
    fn test_unavailable_store_reads_as_signed_out() {
        let h = TestCore::with_defaults();
        h.store.set_available(false);
        assert_eq!(h.core.tokens().get_token(), None);
        h.core.tokens().clear_token();
    }
}
