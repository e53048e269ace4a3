//! # Rate Limit Flows
//!
//! Fixed-window limiting through the assembled core, including the
//! administrative reset path and audit of rejections.

#[cfg(test)]
mod tests {
    use dealer_security::SecurityConfigOverrides;

    use crate::integration::harness::TestCore;

    #[tokio::test]
    async fn test_hundred_then_reject_then_clear_all() {
        let h = TestCore::new(SecurityConfigOverrides {
            rate_limit_max_requests: Some(100),
            ..Default::default()
        });
        let limiter = h.core.rate_limiter();

        for i in 0..100 {
            assert!(limiter.is_allowed("x"), "request {} should pass", i + 1);
        }
        assert!(!limiter.is_allowed("x"));
        assert_eq!(limiter.remaining_requests("x"), 0);

        limiter.clear_all();
        assert!(limiter.is_allowed("x"));
        assert_eq!(limiter.remaining_requests("x"), 99);
    }

    #[tokio::test]
    async fn test_clear_single_identifier() {
        let h = TestCore::new(SecurityConfigOverrides {
            rate_limit_max_requests: Some(2),
            ..Default::default()
        });
        let limiter = h.core.rate_limiter();
        for id in ["/api/deals", "/api/inventory"] {
            limiter.is_allowed(id);
            limiter.is_allowed(id);
        }

        limiter.clear("/api/deals");
        assert_eq!(limiter.remaining_requests("/api/deals"), 2);
        assert!(limiter.is_allowed("/api/deals"));
        assert!(!limiter.is_allowed("/api/inventory"));
    }

    #[tokio::test]
    async fn test_window_rolls_over_with_clock() {
        let h = TestCore::new(SecurityConfigOverrides {
            rate_limit_max_requests: Some(3),
            rate_limit_window_ms: Some(60_000),
            ..Default::default()
        });
        let limiter = h.core.rate_limiter();
        for _ in 0..4 {
            limiter.is_allowed("x");
        }
        assert!(!limiter.is_allowed("x"));

        h.clock.advance(60_000);
        assert_eq!(limiter.remaining_requests("x"), 3);
        assert!(limiter.is_allowed("x"));
    }

    #[tokio::test]
    async fn test_rejections_are_audited() {
        let h = TestCore::new(SecurityConfigOverrides {
            rate_limit_max_requests: Some(1),
            ..Default::default()
        });
        assert!(h.core.check_request("/api/customers"));
        assert!(!h.core.check_request("/api/customers"));
        assert!(!h.core.check_request("/api/customers"));

        h.expect_requests(2).await;
        assert_eq!(h.audit_count("RATE_LIMIT_EXCEEDED"), 2);
        let body = &h.audit_bodies()[0];
        assert_eq!(body["resource"], "api");
        assert_eq!(body["success"], false);
    }
}
