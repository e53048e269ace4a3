//! Session-store key namespace.
//!
//! Every persisted slot is listed here; components never build key strings
//! themselves. The string names are shared with the UI and other tabs.

use std::fmt;

/// A slot in the session-scoped key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    /// Bearer credential value.
    AuthToken,
    /// Absolute expiry of the bearer credential, epoch milliseconds.
    AuthTokenExpires,
    /// Refresh credential, if the backend issued one.
    RefreshToken,
    /// Cached profile of the signed-in user (JSON).
    UserData,
    /// Cached dashboard layout/preferences (JSON).
    DashboardPreferences,
    /// Per-browser-session correlation id.
    SessionId,
}

impl StorageKey {
    /// All slots, in a stable order.
    pub const ALL: [StorageKey; 6] = [
        StorageKey::AuthToken,
        StorageKey::AuthTokenExpires,
        StorageKey::RefreshToken,
        StorageKey::UserData,
        StorageKey::DashboardPreferences,
        StorageKey::SessionId,
    ];

    /// Slots holding credentials.
    pub const CREDENTIALS: [StorageKey; 3] = [
        StorageKey::AuthToken,
        StorageKey::AuthTokenExpires,
        StorageKey::RefreshToken,
    ];

    /// Slots holding cached user state that must not outlive a session.
    pub const USER_CACHE: [StorageKey; 2] = [StorageKey::UserData, StorageKey::DashboardPreferences];

    /// Persisted name of the slot.
    pub const fn as_str(self) -> &'static str {
        match self {
            StorageKey::AuthToken => "auth_token",
            StorageKey::AuthTokenExpires => "auth_token_expires",
            StorageKey::RefreshToken => "refresh_token",
            StorageKey::UserData => "user_data",
            StorageKey::DashboardPreferences => "dashboard_preferences",
            StorageKey::SessionId => "session_id",
        }
    }

    /// Look up a slot by its persisted name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
