//! Idle-session state machine types and session id generation.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lifecycle of a monitored session.
///
/// ```text
/// NotStarted --start--> Active --activity--> Active
///                         |  \
///                 timeout |   \ end_session
///                         v    v
///                    Expired  Terminated
/// ```
///
/// `Expired` and `Terminated` may both be started again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    NotStarted,
    Active,
    Expired,
    Terminated,
}

impl SessionPhase {
    pub fn can_start(self) -> bool {
        !matches!(self, SessionPhase::Active)
    }
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Explicit logout.
    Logout,
    /// No activity for the configured timeout.
    IdleTimeout,
}

impl EndReason {
    pub fn audit_action(self) -> &'static str {
        match self {
            EndReason::Logout => super::audit::actions::SESSION_ENDED,
            EndReason::IdleTimeout => super::audit::actions::SESSION_EXPIRED,
        }
    }

    pub fn phase(self) -> SessionPhase {
        match self {
            EndReason::Logout => SessionPhase::Terminated,
            EndReason::IdleTimeout => SessionPhase::Expired,
        }
    }

    pub fn metric_label(self) -> &'static str {
        match self {
            EndReason::Logout => "ended",
            EndReason::IdleTimeout => "expired",
        }
    }
}

/// Kinds of user activity that renew a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    MouseDown,
    MouseMove,
    KeyPress,
    Scroll,
    TouchStart,
    Click,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 6] = [
        ActivityKind::MouseDown,
        ActivityKind::MouseMove,
        ActivityKind::KeyPress,
        ActivityKind::Scroll,
        ActivityKind::TouchStart,
        ActivityKind::Click,
    ];
}

/// How activity listeners are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Listener never blocks the event.
    pub passive: bool,
    /// Listener runs before page handlers can stop propagation.
    pub capture: bool,
}

impl ListenerOptions {
    pub const ACTIVITY: ListenerOptions = ListenerOptions {
        passive: true,
        capture: true,
    };
}

const SESSION_SUFFIX_LEN: usize = 9;

/// `session_<epoch ms>_<9 lowercase alphanumerics>`
pub fn generate_session_id(now_ms: i64) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("session_{}_{}", now_ms, suffix)
}
