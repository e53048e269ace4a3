//! Assembled security core.
//!
//! [`SecurityCoreBuilder`] wires every component to one shared
//! [`SecurityContext`] and one set of adapters. Anything not supplied falls
//! back to the production adapter (system clock, in-memory session store,
//! `reqwest` transport, host-driven activity source, logging navigator,
//! ephemeral AES-GCM key).
//!
//! # Example
//!
//! ```ignore
//! let core = SecurityCoreBuilder::new()
//!     .overrides(SecurityConfigOverrides::from_env()?)
//!     .build()?;
//!
//! core.on_login("dana@example.com", &token, 3600)?;
//! if !core.check_request("/api/deals") {
//!     // surface "try again later"
//! }
//! ```

use serde_json::json;
use std::sync::Arc;

use crate::adapters::{
    AesGcmCipher, LoggingNavigator, ManualActivitySource, MemoryStore, ReqwestTransport,
    SystemClock,
};
use crate::domain::audit::{actions, resources};
use crate::domain::config::SecurityConfigOverrides;
use crate::domain::errors::{ConfigError, SecurityResult};
use crate::domain::login::LoginDecision;
use crate::ports::{ActivitySource, Cipher, Clock, HttpTransport, KeyValueStore, Navigator};
use crate::service::{
    AuditTrail, CertificateValidator, CspManager, DataCipher, LoginAttemptGuard, RateLimiter,
    SecureLog, SecurityContext, SessionMonitor, TokenStore,
};

/// Builder for [`SecurityCore`].
#[derive(Default)]
pub struct SecurityCoreBuilder {
    overrides: SecurityConfigOverrides,
    store: Option<Arc<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
    transport: Option<Arc<dyn HttpTransport>>,
    activity: Option<Arc<dyn ActivitySource>>,
    navigator: Option<Arc<dyn Navigator>>,
    cipher: Option<Arc<dyn Cipher>>,
}

impl SecurityCoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overrides(mut self, overrides: SecurityConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn activity_source(mut self, activity: Arc<dyn ActivitySource>) -> Self {
        self.activity = Some(activity);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn cipher(mut self, cipher: Arc<dyn Cipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Validate the configuration and assemble every component.
    pub fn build(self) -> SecurityResult<SecurityCore> {
        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let context = SecurityContext::initialize(self.overrides, store.clone(), clock.clone())?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => {
                let user_agent = context.config().user_agent.clone();
                Arc::new(
                    ReqwestTransport::with_user_agent(user_agent.as_deref())
                        .map_err(|e| ConfigError::HttpClient(e.to_string()))?,
                )
            }
        };
        let activity = self
            .activity
            .unwrap_or_else(|| Arc::new(ManualActivitySource::new()));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(LoggingNavigator));
        let cipher = self
            .cipher
            .unwrap_or_else(|| Arc::new(AesGcmCipher::generate()));

        let tokens = TokenStore::new(store, clock);
        let audit = AuditTrail::new(context.clone(), transport.clone());
        let log = SecureLog::new(context.clone(), transport);
        let session = SessionMonitor::new(
            context.clone(),
            tokens.clone(),
            audit.clone(),
            activity,
            navigator,
        );
        let certificates = CertificateValidator::new(context.clone());

        Ok(SecurityCore {
            rate_limiter: RateLimiter::new(context.clone()),
            login_guard: LoginAttemptGuard::new(context.clone(), audit.clone()),
            csp: CspManager::new(context.clone()),
            cipher: DataCipher::new(cipher),
            context,
            tokens,
            session,
            certificates,
            audit,
            log,
        })
    }
}

/// Every security component, sharing one configuration and one set of adapters.
#[derive(Debug)]
pub struct SecurityCore {
    context: SecurityContext,
    tokens: TokenStore,
    session: SessionMonitor,
    rate_limiter: RateLimiter,
    certificates: CertificateValidator,
    cipher: DataCipher,
    audit: AuditTrail,
    log: SecureLog,
    login_guard: LoginAttemptGuard,
    csp: CspManager,
}

impl SecurityCore {
    pub fn builder() -> SecurityCoreBuilder {
        SecurityCoreBuilder::new()
    }

    pub fn context(&self) -> &SecurityContext {
        &self.context
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn session(&self) -> &SessionMonitor {
        &self.session
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn certificates(&self) -> &CertificateValidator {
        &self.certificates
    }

    pub fn cipher(&self) -> &DataCipher {
        &self.cipher
    }

    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    pub fn log(&self) -> &SecureLog {
        &self.log
    }

    pub fn login_guard(&self) -> &LoginAttemptGuard {
        &self.login_guard
    }

    pub fn csp(&self) -> &CspManager {
        &self.csp
    }

    /// Store the credential and start the idle-session monitor.
    ///
    /// A locked account is refused without touching the token store. Logging
    /// in again while a session is active keeps that session and renews its
    /// idle timer.
    pub fn on_login(
        &self,
        account: &str,
        token: &str,
        expires_in_secs: i64,
    ) -> SecurityResult<LoginDecision> {
        let decision = self.login_guard.check(account);
        if let LoginDecision::LockedOut { until_epoch_ms } = decision {
            self.audit.log_auth_event(
                actions::LOGIN_FAILURE,
                false,
                Some(json!({ "account": account, "lockedUntil": until_epoch_ms })),
            );
            return Ok(decision);
        }

        self.tokens.set_token(token, expires_in_secs)?;
        self.login_guard.record_success(account);
        self.audit
            .log_auth_event(actions::LOGIN_SUCCESS, true, Some(json!({ "account": account })));
        if !self.session.start_session() {
            self.session.refresh_session();
        }
        Ok(LoginDecision::Allowed {
            remaining: self.context.config().max_login_attempts,
        })
    }

    /// Count a rejected login and audit it.
    pub fn on_login_failure(&self, account: &str) -> LoginDecision {
        self.audit
            .log_auth_event(actions::LOGIN_FAILURE, false, Some(json!({ "account": account })));
        self.login_guard.record_failure(account)
    }

    /// Explicit logout: audit, end the session and drop credentials.
    pub fn on_logout(&self) {
        self.audit.log_auth_event(actions::LOGOUT, true, None);
        if !self.session.end_session() {
            self.tokens.clear_token();
        }
    }

    /// Rate-limit check for an outgoing API call; rejections are audited.
    pub fn check_request(&self, endpoint: &str) -> bool {
        let allowed = self.rate_limiter.is_allowed(endpoint);
        if !allowed {
            self.audit.log_security_event(
                actions::RATE_LIMIT_EXCEEDED,
                resources::API,
                false,
                Some(json!({ "endpoint": endpoint })),
            );
        }
        allowed
    }

    /// Pinning check for a server certificate; rejections are audited.
    pub fn verify_certificate(&self, fingerprint: &str) -> bool {
        let accepted = self.certificates.validate_certificate(fingerprint);
        if !accepted {
            self.audit.log_security_event(
                actions::CERTIFICATE_REJECTED,
                resources::CERTIFICATE,
                false,
                Some(json!({ "fingerprint": fingerprint })),
            );
        }
        accepted
    }
}
