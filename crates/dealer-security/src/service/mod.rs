//! Service layer: the stateful security components.

pub mod audit_trail;
pub mod certificate;
pub mod context;
pub mod csp;
pub mod data_cipher;
pub mod dispatch;
pub mod login_guard;
pub mod rate_limiter;
pub mod secure_log;
pub mod session_monitor;
pub mod token_store;

pub use audit_trail::AuditTrail;
pub use certificate::CertificateValidator;
pub use context::SecurityContext;
pub use csp::CspManager;
pub use data_cipher::{decrypt_with_key, DataCipher};
pub use dispatch::{Dispatcher, Sink};
pub use login_guard::LoginAttemptGuard;
pub use rate_limiter::RateLimiter;
pub use secure_log::SecureLog;
pub use session_monitor::SessionMonitor;
pub use token_store::TokenStore;
