//! # Audit and Secure Log Delivery
//!
//! Entries reach the gateway endpoints in the documented JSON shape with
//! sensitive values redacted. Delivery failures never reach the caller.

#[cfg(test)]
mod tests {
    use dealer_security::{Environment, SecurityConfigOverrides, UserAction};
    use dealer_telemetry::{register_metrics, AUDIT_EVENTS};
    use serde_json::json;

    use crate::integration::harness::TestCore;

    fn production() -> SecurityConfigOverrides {
        SecurityConfigOverrides {
            environment: Some(Environment::Production),
            api_base_url: Some("https://dms.example.com".into()),
            user_agent: Some("dealer-dashboard/2.3".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_secure_log_redacts_before_sending() {
        let h = TestCore::new(production());
        h.core.log().error(
            "Password is invalid: secret123",
            Some(json!({"username": "dana", "password": "hunter2", "attempt": 3})),
        );

        h.expect_requests(1).await;
        let requests = h.transport.requests();
        assert_eq!(requests[0].url, "https://dms.example.com/api/logs/security");

        let body = &requests[0].body;
        assert_eq!(body["level"], "ERROR");
        assert!(!body["message"].as_str().unwrap().contains("secret123"));
        assert_eq!(body["context"]["password"], "[REDACTED]");
        assert_eq!(body["context"]["username"], "dana");
        assert_eq!(body["context"]["attempt"], 3);
        assert_eq!(body["timestamp"], "2023-11-14T22:13:20.000Z");
    }

    #[tokio::test]
    async fn test_development_logs_stay_local() {
        let h = TestCore::with_defaults();
        h.core.log().warn("token refresh took 900ms", None);
        h.core.log().info("dashboard ready", None);
        h.settle().await;
        assert!(h.log_bodies().is_empty());
    }

    #[tokio::test]
    async fn test_audit_event_shape() {
        let h = TestCore::new(production());
        h.core.audit().log_user_action(
            UserAction::new("EXPORT_REPORT", "deals", true)
                .with_details(json!({"rows": 42, "apiKey": "ak-1", "token": "t"}))
                .with_ip_address("10.1.2.3"),
        );

        h.expect_requests(1).await;
        let requests = h.transport.requests();
        assert_eq!(requests[0].url, "https://dms.example.com/api/audit/log");

        let body = &requests[0].body;
        assert_eq!(body["action"], "EXPORT_REPORT");
        assert_eq!(body["resource"], "deals");
        assert_eq!(body["success"], true);
        assert_eq!(body["userId"], "anonymous");
        assert_eq!(body["ipAddress"], "10.1.2.3");
        assert_eq!(body["userAgent"], "dealer-dashboard/2.3");
        assert_eq!(body["sessionId"], h.core.context().session_id());
        assert_eq!(body["details"]["rows"], 42);
        assert_eq!(body["details"]["token"], "[REDACTED]");
        // Only exact sensitive names are replaced.
        assert_eq!(body["details"]["apiKey"], "ak-1");
    }

    #[tokio::test]
    async fn test_failing_sinks_do_not_surface() {
        let h = TestCore::new(production());
        h.transport.set_failing(true);

        h.core.log().error("collector down", None);
        h.core.audit().log_auth_event("LOGIN_FAILURE", false, None);
        h.core.audit().log_data_access("vehicles", "delete", false, None);

        h.expect_requests(3).await;
        assert_eq!(h.audit_count("DATA_DELETE"), 1);
    }

    #[tokio::test]
    async fn test_audit_metrics_are_exported() {
        let metrics = register_metrics().unwrap();
        let before = AUDIT_EVENTS.with_label_values(&["auth"]).get();

        let h = TestCore::with_defaults();
        h.core.audit().log_auth_event("LOGOUT", true, None);

        assert!(AUDIT_EVENTS.with_label_values(&["auth"]).get() >= before + 1.0);
        assert!(metrics.gather_text().unwrap().contains("dg_audit_events_total"));
    }

    #[tokio::test]
    async fn test_certificate_rejection_is_audited() {
        let h = TestCore::new(SecurityConfigOverrides {
            pinned_fingerprints: Some(["AB:CD:EF".to_string()].into_iter().collect()),
            ..Default::default()
        });
        assert!(h.core.verify_certificate("AB:CD:EF"));
        assert!(!h.core.verify_certificate("00:11:22"));

        h.expect_requests(1).await;
        assert_eq!(h.audit_count("CERTIFICATE_REJECTED"), 1);
    }
}
