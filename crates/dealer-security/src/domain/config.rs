//! Security configuration with defaults, overrides and validation.
//!
//! This is the only module that reads environment variables; everything else
//! receives a [`SecurityConfig`] snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use super::errors::ConfigError;
use super::pinning::parse_fingerprint_list;

/// 30 minutes.
pub const DEFAULT_SESSION_TIMEOUT_MS: u64 = 30 * 60 * 1000;
pub const DEFAULT_MAX_LOGIN_ATTEMPTS: u32 = 5;
/// 15 minutes.
pub const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 15 * 60 * 1000;
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;
pub const DEFAULT_AUDIT_LOG_ENDPOINT: &str = "/api/audit/log";
pub const DEFAULT_SECURE_LOG_ENDPOINT: &str = "/api/logs/security";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

/// What certificate validation does when no fingerprints are pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PinningMode {
    /// Empty pin set accepts every certificate.
    #[default]
    FailOpen,
    /// Empty pin set rejects every certificate.
    FailClosed,
}

impl FromStr for PinningMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail-open" | "open" => Ok(PinningMode::FailOpen),
            "fail-closed" | "closed" | "strict" => Ok(PinningMode::FailClosed),
            _ => Err(()),
        }
    }
}

/// Central security configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityConfig {
    pub environment: Environment,
    /// Idle time before a session is terminated
    pub session_timeout_ms: u64,
    /// Consecutive failed logins before an account is locked
    pub max_login_attempts: u32,
    /// How long a locked account stays locked
    pub login_lockout_ms: u64,
    pub rate_limit_window_ms: u64,
    pub rate_limit_max_requests: u32,
    /// Base URL prepended to relative endpoints
    pub api_base_url: String,
    pub audit_log_endpoint: String,
    pub secure_log_endpoint: String,
    pub pinned_fingerprints: BTreeSet<String>,
    pub pinning_mode: PinningMode,
    /// Empty until resolved by `SecurityContext::initialize`
    pub csp_nonce: String,
    /// Reported in audit events when known
    pub user_agent: Option<String>,
    /// Empty until resolved by `SecurityContext::initialize`
    pub session_id: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            session_timeout_ms: DEFAULT_SESSION_TIMEOUT_MS,
            max_login_attempts: DEFAULT_MAX_LOGIN_ATTEMPTS,
            login_lockout_ms: DEFAULT_RATE_LIMIT_WINDOW_MS,
            rate_limit_window_ms: DEFAULT_RATE_LIMIT_WINDOW_MS,
            rate_limit_max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            audit_log_endpoint: DEFAULT_AUDIT_LOG_ENDPOINT.to_string(),
            secure_log_endpoint: DEFAULT_SECURE_LOG_ENDPOINT.to_string(),
            pinned_fingerprints: BTreeSet::new(),
            pinning_mode: PinningMode::default(),
            csp_nonce: String::new(),
            user_agent: None,
            session_id: String::new(),
        }
    }
}

impl SecurityConfig {
    /// Defaults merged with `DG_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::default().merged(SecurityConfigOverrides::from_env()?))
    }

    /// Return a copy with every `Some` field of `overrides` applied.
    pub fn merged(mut self, overrides: SecurityConfigOverrides) -> Self {
        self.apply(overrides);
        self
    }

    /// Replace the fields present in `overrides`.
    pub fn apply(&mut self, overrides: SecurityConfigOverrides) {
        let SecurityConfigOverrides {
            environment,
            session_timeout_ms,
            max_login_attempts,
            login_lockout_ms,
            rate_limit_window_ms,
            rate_limit_max_requests,
            api_base_url,
            audit_log_endpoint,
            secure_log_endpoint,
            pinned_fingerprints,
            pinning_mode,
            csp_nonce,
            user_agent,
        } = overrides;

        if let Some(v) = environment {
            self.environment = v;
        }
        if let Some(v) = session_timeout_ms {
            self.session_timeout_ms = v;
        }
        if let Some(v) = max_login_attempts {
            self.max_login_attempts = v;
        }
        if let Some(v) = login_lockout_ms {
            self.login_lockout_ms = v;
        }
        if let Some(v) = rate_limit_window_ms {
            self.rate_limit_window_ms = v;
        }
        if let Some(v) = rate_limit_max_requests {
            self.rate_limit_max_requests = v;
        }
        if let Some(v) = api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = audit_log_endpoint {
            self.audit_log_endpoint = v;
        }
        if let Some(v) = secure_log_endpoint {
            self.secure_log_endpoint = v;
        }
        if let Some(v) = pinned_fingerprints {
            self.pinned_fingerprints = v;
        }
        if let Some(v) = pinning_mode {
            self.pinning_mode = v;
        }
        if let Some(v) = csp_nonce {
            self.csp_nonce = v;
        }
        if let Some(v) = user_agent {
            self.user_agent = Some(v);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_timeout_ms == 0 {
            return Err(ConfigError::MustBePositive("sessionTimeoutMs"));
        }
        if self.max_login_attempts == 0 {
            return Err(ConfigError::MustBePositive("maxLoginAttempts"));
        }
        if self.rate_limit_window_ms == 0 {
            return Err(ConfigError::MustBePositive("rateLimitWindowMs"));
        }
        if self.rate_limit_max_requests == 0 {
            return Err(ConfigError::MustBePositive("rateLimitMaxRequests"));
        }
        Ok(())
    }

    /// Absolute URL of the audit sink.
    pub fn audit_log_url(&self) -> String {
        join_endpoint(&self.api_base_url, &self.audit_log_endpoint)
    }

    /// Absolute URL of the secure log sink.
    pub fn secure_log_url(&self) -> String {
        join_endpoint(&self.api_base_url, &self.secure_log_endpoint)
    }
}

fn join_endpoint(base: &str, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.to_string();
    }
    let base = base.trim_end_matches('/');
    if endpoint.starts_with('/') {
        format!("{}{}", base, endpoint)
    } else {
        format!("{}/{}", base, endpoint)
    }
}

/// Caller-supplied values merged over the defaults. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityConfigOverrides {
    pub environment: Option<Environment>,
    pub session_timeout_ms: Option<u64>,
    pub max_login_attempts: Option<u32>,
    pub login_lockout_ms: Option<u64>,
    pub rate_limit_window_ms: Option<u64>,
    pub rate_limit_max_requests: Option<u32>,
    pub api_base_url: Option<String>,
    pub audit_log_endpoint: Option<String>,
    pub secure_log_endpoint: Option<String>,
    pub pinned_fingerprints: Option<BTreeSet<String>>,
    pub pinning_mode: Option<PinningMode>,
    pub csp_nonce: Option<String>,
    pub user_agent: Option<String>,
}

impl SecurityConfigOverrides {
    /// Read overrides from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `DG_ENVIRONMENT`: development / test / production
    /// - `DG_SESSION_TIMEOUT_MS`, `DG_MAX_LOGIN_ATTEMPTS`, `DG_LOGIN_LOCKOUT_MS`
    /// - `DG_RATE_LIMIT_WINDOW_MS`, `DG_RATE_LIMIT_MAX_REQUESTS`
    /// - `DG_API_BASE_URL`, `DG_AUDIT_LOG_ENDPOINT`, `DG_SECURE_LOG_ENDPOINT`
    /// - `DG_CERT_FINGERPRINTS`: comma separated
    /// - `DG_PINNING_MODE`: fail-open / fail-closed
    /// - `DG_CSP_NONCE`: generated when absent
    /// - `DG_USER_AGENT`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            environment: parse_with(&get, "DG_ENVIRONMENT", |v| v.parse().ok())?,
            session_timeout_ms: parse_with(&get, "DG_SESSION_TIMEOUT_MS", |v| v.trim().parse().ok())?,
            max_login_attempts: parse_with(&get, "DG_MAX_LOGIN_ATTEMPTS", |v| v.trim().parse().ok())?,
            login_lockout_ms: parse_with(&get, "DG_LOGIN_LOCKOUT_MS", |v| v.trim().parse().ok())?,
            rate_limit_window_ms: parse_with(&get, "DG_RATE_LIMIT_WINDOW_MS", |v| {
                v.trim().parse().ok()
            })?,
            rate_limit_max_requests: parse_with(&get, "DG_RATE_LIMIT_MAX_REQUESTS", |v| {
                v.trim().parse().ok()
            })?,
            api_base_url: get("DG_API_BASE_URL"),
            audit_log_endpoint: get("DG_AUDIT_LOG_ENDPOINT"),
            secure_log_endpoint: get("DG_SECURE_LOG_ENDPOINT"),
            pinned_fingerprints: get("DG_CERT_FINGERPRINTS").map(|v| parse_fingerprint_list(&v)),
            pinning_mode: parse_with(&get, "DG_PINNING_MODE", |v| v.parse().ok())?,
            csp_nonce: get("DG_CSP_NONCE").map(|v| v.trim().to_string()),
            user_agent: get("DG_USER_AGENT"),
        })
    }
}

fn parse_with<T, G, P>(get: &G, var: &str, parse: P) -> Result<Option<T>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    match get(var) {
        None => Ok(None),
        Some(raw) => parse(&raw).map(Some).ok_or(ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw,
        }),
    }
}
