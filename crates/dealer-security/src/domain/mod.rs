//! Domain layer: value types and pure rules, no I/O.

pub mod audit;
pub mod config;
pub mod csp;
pub mod errors;
pub mod keys;
pub mod login;
pub mod pinning;
pub mod rate_limit;
pub mod redaction;
pub mod sanitize;
pub mod session;
pub mod token;

pub use audit::{actions, AuditEvent, LogEntry, LogLevel, UserAction, ANONYMOUS_USER};
pub use config::{Environment, PinningMode, SecurityConfig, SecurityConfigOverrides};
pub use errors::{
    ConfigError, SecurityError, SecurityResult, StorageError, TransportError, ValidationError,
};
pub use keys::StorageKey;
pub use login::{AttemptRecord, LoginDecision};
pub use pinning::PinSet;
pub use rate_limit::RateWindow;
pub use session::{ActivityKind, EndReason, ListenerOptions, SessionPhase};
pub use token::Token;
