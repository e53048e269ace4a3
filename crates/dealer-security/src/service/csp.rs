//! Content-Security-Policy headers for the configured nonce.

use crate::domain::csp;
use crate::service::context::SecurityContext;

#[derive(Debug, Clone)]
pub struct CspManager {
    context: SecurityContext,
}

impl CspManager {
    pub fn new(context: SecurityContext) -> Self {
        Self { context }
    }

    /// Nonce for this page load, resolved at initialization.
    pub fn nonce(&self) -> String {
        self.context.config().csp_nonce.clone()
    }

    pub fn header_value(&self) -> String {
        csp::policy_value(&self.nonce())
    }

    pub fn security_headers(&self) -> Vec<(&'static str, String)> {
        csp::security_headers(&self.nonce())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ManualClock, MemoryStore};
    use crate::domain::config::SecurityConfigOverrides;
    use std::sync::Arc;

    #[test]
    fn test_header_uses_configured_nonce() {
        let context = SecurityContext::initialize(
            SecurityConfigOverrides {
                csp_nonce: Some("r4nd0m".into()),
                ..Default::default()
            },
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::new(0)),
        )
        .unwrap();
        let csp = CspManager::new(context);
        assert_eq!(csp.nonce(), "r4nd0m");
        assert!(csp.header_value().contains("'nonce-r4nd0m'"));
        assert_eq!(csp.security_headers().len(), 5);
    }
}
