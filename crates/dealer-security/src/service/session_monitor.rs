//! Idle-session timeout.
//!
//! A started session arms one tokio timer for `session_timeout_ms`. Every
//! user activity aborts that timer and arms a new one, so at most one timer
//! is pending per session. Each timer carries a generation number and only
//! the most recent generation may expire the session.
//!
//! Ending a session (timeout or logout) clears the credentials and cached
//! user data, records one audit event and asks the navigator to return to
//! the login page. Renewals are never audited.

use parking_lot::Mutex;
use serde_json::json;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use dealer_telemetry::SESSIONS;

use crate::domain::audit::{actions, resources};
use crate::domain::keys::StorageKey;
use crate::domain::session::{ActivityKind, EndReason, ListenerOptions, SessionPhase};
use crate::ports::{ActivitySource, ListenerId, Navigator};
use crate::service::audit_trail::AuditTrail;
use crate::service::context::SecurityContext;
use crate::service::token_store::TokenStore;

#[derive(Debug, Default)]
struct SessionState {
    phase: SessionPhase,
    started_at_ms: i64,
    last_activity_ms: i64,
    timer: Option<AbortHandle>,
    generation: u64,
    session_id: String,
    listener: Option<ListenerId>,
}

struct SessionInner {
    context: SecurityContext,
    tokens: TokenStore,
    audit: AuditTrail,
    activity: Arc<dyn ActivitySource>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<SessionState>,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        if let Some(id) = state.listener.take() {
            self.activity.unregister(id);
        }
    }
}

/// Session monitor handle. Clones share one session.
#[derive(Clone)]
pub struct SessionMonitor {
    inner: Arc<SessionInner>,
}

impl SessionMonitor {
    pub fn new(
        context: SecurityContext,
        tokens: TokenStore,
        audit: AuditTrail,
        activity: Arc<dyn ActivitySource>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                context,
                tokens,
                audit,
                activity,
                navigator,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    /// Begin monitoring. Returns false if a session is already active.
    pub fn start_session(&self) -> bool {
        let now = self.inner.context.now_ms();
        let session_id = {
            let mut state = self.inner.state.lock();
            if !state.phase.can_start() {
                debug!("Session already active");
                return false;
            }

            state.phase = SessionPhase::Active;
            state.started_at_ms = now;
            state.last_activity_ms = now;
            state.session_id = self.inner.context.session_id();
            self.arm(&mut state);

            if state.listener.is_none() {
                state.listener = Some(self.inner.activity.register(
                    &ActivityKind::ALL,
                    ListenerOptions::ACTIVITY,
                    self.activity_handler(),
                ));
            }
            state.session_id.clone()
        };

        SESSIONS.with_label_values(&["started"]).inc();
        info!(session_id = %session_id, "Session started");
        self.inner.audit.log_security_event(
            actions::SESSION_STARTED,
            resources::SESSION,
            true,
            None,
        );
        true
    }

    /// Record activity and push the timeout back. Ignored unless active.
    pub fn refresh_session(&self) {
        let now = self.inner.context.now_ms();
        let mut state = self.inner.state.lock();
        if state.phase != SessionPhase::Active {
            return;
        }
        state.last_activity_ms = now;
        self.arm(&mut state);
    }

    /// Explicit logout. Calling it again, or without an active session, does nothing.
    pub fn end_session(&self) -> bool {
        self.terminate(EndReason::Logout, None)
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.state.lock().phase
    }

    pub fn is_active(&self) -> bool {
        self.phase() == SessionPhase::Active
    }

    pub fn session_id(&self) -> Option<String> {
        let state = self.inner.state.lock();
        (state.phase == SessionPhase::Active).then(|| state.session_id.clone())
    }

    pub fn last_activity_ms(&self) -> Option<i64> {
        let state = self.inner.state.lock();
        (state.phase == SessionPhase::Active).then_some(state.last_activity_ms)
    }

    /// Milliseconds of idleness left before the session expires.
    pub fn time_until_timeout_ms(&self) -> Option<u64> {
        let last = self.last_activity_ms()?;
        let timeout = self.inner.context.config().session_timeout_ms as i64;
        let idle = self.inner.context.now_ms().saturating_sub(last);
        Some(timeout.saturating_sub(idle).max(0) as u64)
    }

    pub fn has_pending_timer(&self) -> bool {
        self.inner.state.lock().timer.is_some()
    }

    /// Abort the previous timer and arm a new one for the configured timeout.
    fn arm(&self, state: &mut SessionState) {
        if let Some(previous) = state.timer.take() {
            previous.abort();
        }
        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;
        let timeout = Duration::from_millis(self.inner.context.config().session_timeout_ms);

        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime, idle timeout not armed");
            return;
        };

        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);
        let task = runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(inner) = weak.upgrade() {
                SessionMonitor { inner }.terminate(EndReason::IdleTimeout, Some(generation));
            }
        });
        state.timer = Some(task.abort_handle());
    }

    fn activity_handler(&self) -> Arc<dyn Fn(ActivityKind) + Send + Sync> {
        let weak = Arc::downgrade(&self.inner);
        Arc::new(move |_: ActivityKind| {
            if let Some(inner) = weak.upgrade() {
                SessionMonitor { inner }.refresh_session();
            }
        })
    }

    fn terminate(&self, reason: EndReason, generation: Option<u64>) -> bool {
        let now = self.inner.context.now_ms();
        let (listener, session_id, duration_ms) = {
            let mut state = self.inner.state.lock();
            if state.phase != SessionPhase::Active {
                return false;
            }
            if generation.is_some_and(|g| g != state.generation) {
                debug!("Stale session timer ignored");
                return false;
            }

            state.phase = reason.phase();
            if let Some(timer) = state.timer.take() {
                // The expiring timer is the running task; it has no await left.
                if generation.is_none() {
                    timer.abort();
                }
            }
            (
                state.listener.take(),
                state.session_id.clone(),
                now.saturating_sub(state.started_at_ms),
            )
        };

        if let Some(id) = listener {
            self.inner.activity.unregister(id);
        }

        SESSIONS.with_label_values(&[reason.metric_label()]).inc();
        info!(session_id = %session_id, ?reason, duration_ms, "Session ended");
        self.inner.audit.log_security_event(
            reason.audit_action(),
            resources::SESSION,
            true,
            Some(json!({
                "reason": reason.metric_label(),
                "durationMs": duration_ms,
            })),
        );

        // Cleared after the audit event is built so it still names the user.
        self.inner.tokens.clear_token();
        let store = self.inner.context.store();
        for key in StorageKey::USER_CACHE {
            if let Err(e) = store.remove(key) {
                debug!(key = %key, error = %e, "Could not clear cached user data");
            }
        }

        self.inner.navigator.redirect_to_login(reason);
        true
    }
}

impl std::fmt::Debug for SessionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMonitor")
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
