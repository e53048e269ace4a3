//! Audit event and security log entry shapes.
//!
//! Both are immutable once built and serialize to the JSON bodies the API
//! gateway accepts on its audit and security-log endpoints.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known audit actions.
pub mod actions {
    pub const SESSION_STARTED: &str = "SESSION_STARTED";
    pub const SESSION_ENDED: &str = "SESSION_ENDED";
    pub const SESSION_EXPIRED: &str = "SESSION_EXPIRED";
    pub const LOGIN_SUCCESS: &str = "LOGIN_SUCCESS";
    pub const LOGIN_FAILURE: &str = "LOGIN_FAILURE";
    pub const LOGOUT: &str = "LOGOUT";
    pub const ACCOUNT_LOCKED: &str = "ACCOUNT_LOCKED";
    pub const RATE_LIMIT_EXCEEDED: &str = "RATE_LIMIT_EXCEEDED";
    pub const CERTIFICATE_REJECTED: &str = "CERTIFICATE_REJECTED";
    pub const DECRYPTION_FAILED: &str = "DECRYPTION_FAILED";
}

/// Well-known resources.
pub mod resources {
    pub const SESSION: &str = "session";
    pub const AUTHENTICATION: &str = "authentication";
    pub const API: &str = "api";
    pub const CERTIFICATE: &str = "certificate";
}

/// User id recorded when nobody is signed in.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Caller-supplied part of an audit event. The trail fills in the rest.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserAction {
    pub action: String,
    pub resource: String,
    pub success: bool,
    pub details: Option<Value>,
    pub ip_address: Option<String>,
}

impl UserAction {
    pub fn new(action: impl Into<String>, resource: impl Into<String>, success: bool) -> Self {
        Self {
            action: action.into(),
            resource: resource.into(),
            success,
            ..Default::default()
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }
}

/// Body of an audit POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub action: String,
    pub resource: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Severity of a security log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
        }
    }
}

/// Body of a security-log POST. Message and context are already redacted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

/// Convert epoch milliseconds to a UTC timestamp, clamping out-of-range input.
pub fn timestamp_from_millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
mod iso_millis {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
