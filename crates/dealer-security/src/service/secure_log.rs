//! Redacting security logger.
//!
//! Messages and context are redacted first. Outside production the entry is
//! mirrored to the local `tracing` subscriber; in production it goes only to
//! the remote collector.

use serde_json::Value;
use std::sync::Arc;

use crate::domain::audit::{timestamp_from_millis, LogEntry, LogLevel};
use crate::domain::redaction::{redact_context, redact_message};
use crate::ports::HttpTransport;
use crate::service::context::SecurityContext;
use crate::service::dispatch::{Dispatcher, Sink};

const CONSOLE_TARGET: &str = "dealer_security::secure_log";

#[derive(Clone, Debug)]
pub struct SecureLog {
    context: SecurityContext,
    dispatcher: Dispatcher,
}

impl SecureLog {
    pub fn new(context: SecurityContext, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            context,
            dispatcher: Dispatcher::new(transport, Sink::SecureLog),
        }
    }

    pub fn error(&self, message: &str, context: Option<Value>) {
        self.log(LogLevel::Error, message, context);
    }

    pub fn warn(&self, message: &str, context: Option<Value>) {
        self.log(LogLevel::Warn, message, context);
    }

    pub fn info(&self, message: &str, context: Option<Value>) {
        self.log(LogLevel::Info, message, context);
    }

    /// The redacted entry that would be emitted for this call.
    pub fn prepare(&self, level: LogLevel, message: &str, context: Option<&Value>) -> LogEntry {
        LogEntry {
            level,
            message: redact_message(message).into_owned(),
            context: context.map(redact_context),
            timestamp: timestamp_from_millis(self.context.now_ms()),
        }
    }

    fn log(&self, level: LogLevel, message: &str, context: Option<Value>) {
        let entry = self.prepare(level, message, context.as_ref());

        if self.context.is_production() {
            match serde_json::to_value(&entry) {
                Ok(body) => {
                    self.dispatcher
                        .spawn(self.context.config().secure_log_url(), body);
                }
                Err(e) => tracing::debug!(error = %e, "Log entry not serializable"),
            }
        } else {
            mirror(&entry);
        }
    }
}

fn mirror(entry: &LogEntry) {
    let context = entry.context.as_ref().map(Value::to_string);
    match entry.level {
        LogLevel::Error => {
            tracing::error!(target: CONSOLE_TARGET, context = ?context, "{}", entry.message)
        }
        LogLevel::Warn => {
            tracing::warn!(target: CONSOLE_TARGET, context = ?context, "{}", entry.message)
        }
        LogLevel::Info => {
            tracing::info!(target: CONSOLE_TARGET, context = ?context, "{}", entry.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ManualClock, MemoryStore, RecordingTransport};
    use crate::domain::config::{Environment, SecurityConfigOverrides};
    use crate::domain::redaction::REDACTED;
    use serde_json::json;
    use std::time::Duration;

    fn setup(environment: Environment) -> (SecureLog, Arc<RecordingTransport>) {
        let context = SecurityContext::initialize(
            SecurityConfigOverrides {
                environment: Some(environment),
                ..Default::default()
            },
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::new(0)),
        )
        .unwrap();
        let transport = Arc::new(RecordingTransport::new());
        (SecureLog::new(context, transport.clone()), transport)
    }

    #[test]
    fn test_prepare_redacts_message_and_context() {
        let (log, _) = setup(Environment::Development);
        let entry = log.prepare(
            LogLevel::Error,
            "Password is invalid: secret123",
            Some(&json!({"token": "abc", "dealer": 12})),
        );
        assert!(!entry.message.contains("secret123"));
        let context = entry.context.unwrap();
        assert_eq!(context["token"], REDACTED);
        assert_eq!(context["dealer"], 12);
    }

    #[tokio::test]
    async fn test_production_posts_to_collector() {
        let (log, transport) = setup(Environment::Production);
        log.error("Password is invalid: secret123", None);

        assert!(transport.wait_for_requests(1, Duration::from_secs(1)).await);
        let bodies = transport.bodies_for("/api/logs/security");
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["level"], "ERROR");
        assert!(!bodies[0]["message"].as_str().unwrap().contains("secret123"));
        assert!(bodies[0].get("context").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_development_stays_local() {
        let (log, transport) = setup(Environment::Development);
        log.warn("slow inventory sync", Some(json!({"ms": 900})));
        log.info("ready", None);

        assert!(!transport.wait_for_requests(1, Duration::from_millis(100)).await);
    }

    #[tokio::test]
    async fn test_failing_collector_is_silent() {
        let (log, transport) = setup(Environment::Production);
        transport.set_failing(true);
        log.warn("first", None);
        log.warn("second", None);
        assert!(transport.wait_for_requests(2, Duration::from_secs(1)).await);
    }
}
