//! Shared configuration holder.
//!
//! Created once per process, cloned cheaply into every component. Readers get
//! an immutable snapshot; `update_config` swaps in a new one.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::config::{SecurityConfig, SecurityConfigOverrides};
use crate::domain::csp::generate_nonce;
use crate::domain::errors::SecurityResult;
use crate::domain::keys::StorageKey;
use crate::domain::session::generate_session_id;
use crate::ports::{Clock, KeyValueStore};

#[derive(Clone)]
pub struct SecurityContext {
    config: Arc<RwLock<Arc<SecurityConfig>>>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl SecurityContext {
    /// Merge `overrides` over the defaults, validate, and mint a session id.
    ///
    /// The session id is written to the `session_id` slot. A store that
    /// cannot be written does not fail initialization; the id is still kept
    /// in memory.
    pub fn initialize(
        overrides: SecurityConfigOverrides,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> SecurityResult<Self> {
        let mut config = SecurityConfig::default().merged(overrides);
        config.validate()?;

        if config.csp_nonce.is_empty() {
            config.csp_nonce = generate_nonce();
        }
        config.session_id = generate_session_id(clock.now_ms());

        if let Err(e) = store.set(StorageKey::SessionId, &config.session_id) {
            warn!(error = %e, "Could not persist session id");
        }

        info!(
            environment = ?config.environment,
            session_timeout_ms = config.session_timeout_ms,
            rate_limit_max_requests = config.rate_limit_max_requests,
            pinned = config.pinned_fingerprints.len(),
            "Security context initialized"
        );

        Ok(Self {
            config: Arc::new(RwLock::new(Arc::new(config))),
            store,
            clock,
        })
    }

    /// Initialize from `DG_*` environment variables.
    pub fn from_env(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> SecurityResult<Self> {
        Self::initialize(SecurityConfigOverrides::from_env()?, store, clock)
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<SecurityConfig> {
        self.config.read().clone()
    }

    /// Replace only the fields present in `overrides`.
    ///
    /// The new configuration is validated before it becomes visible; on
    /// error the previous snapshot stays in place.
    pub fn update_config(&self, overrides: SecurityConfigOverrides) -> SecurityResult<()> {
        let mut guard = self.config.write();
        let mut next = SecurityConfig::clone(&guard);
        next.apply(overrides);
        next.validate()?;
        *guard = Arc::new(next);
        debug!("Security configuration updated");
        Ok(())
    }

    pub fn session_id(&self) -> String {
        self.config.read().session_id.clone()
    }

    pub fn is_production(&self) -> bool {
        self.config.read().environment.is_production()
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}

impl std::fmt::Debug for SecurityContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityContext")
            .field("config", &self.config())
            .finish_non_exhaustive()
    }
}
