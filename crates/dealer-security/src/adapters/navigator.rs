//! Navigator adapters.

use parking_lot::Mutex;

use crate::domain::session::EndReason;
use crate::ports::Navigator;

/// Path of the unauthenticated entry point.
pub const LOGIN_PATH: &str = "/login";

/// Navigator for headless hosts: records the redirect in the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn redirect_to_login(&self, reason: EndReason) {
        tracing::info!(path = LOGIN_PATH, ?reason, "Redirecting to login");
    }
}

/// Navigator that remembers every redirect.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<EndReason>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> Vec<EndReason> {
        self.redirects.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self, reason: EndReason) {
        self.redirects.lock().push(reason);
    }
}
