//! Structured audit events.
//!
//! Every event carries timestamp, user, action, resource and outcome, plus
//! the session id and user agent from configuration. Details are redacted by
//! key before they leave the process. Delivery is fire-and-forget.

use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use dealer_telemetry::AUDIT_EVENTS;

use crate::domain::audit::{resources, timestamp_from_millis, AuditEvent, UserAction, ANONYMOUS_USER};
use crate::domain::errors::TransportError;
use crate::domain::keys::StorageKey;
use crate::domain::redaction::redact_context;
use crate::ports::HttpTransport;
use crate::service::context::SecurityContext;
use crate::service::dispatch::{Dispatcher, Sink};

#[derive(Clone, Copy)]
enum Category {
    User,
    Security,
    Auth,
    Data,
}

impl Category {
    fn label(self) -> &'static str {
        match self {
            Category::User => "user",
            Category::Security => "security",
            Category::Auth => "auth",
            Category::Data => "data",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuditTrail {
    context: SecurityContext,
    dispatcher: Dispatcher,
}

impl AuditTrail {
    pub fn new(context: SecurityContext, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            context,
            dispatcher: Dispatcher::new(transport, Sink::Audit),
        }
    }

    /// Record a caller-described action.
    pub fn log_user_action(&self, action: UserAction) {
        self.record(Category::User, action);
    }

    pub fn log_security_event(
        &self,
        action: &str,
        resource: &str,
        success: bool,
        details: Option<Value>,
    ) {
        self.record(
            Category::Security,
            UserAction {
                details,
                ..UserAction::new(action, resource, success)
            },
        );
    }

    /// Authentication events are recorded against the `authentication` resource.
    pub fn log_auth_event(&self, action: &str, success: bool, details: Option<Value>) {
        self.record(
            Category::Auth,
            UserAction {
                details,
                ..UserAction::new(action, resources::AUTHENTICATION, success)
            },
        );
    }

    /// Recorded as action `DATA_<OPERATION>`, e.g. `DATA_READ`.
    pub fn log_data_access(
        &self,
        resource: &str,
        operation: &str,
        success: bool,
        details: Option<Value>,
    ) {
        let action = format!("DATA_{}", operation.to_uppercase());
        self.record(
            Category::Data,
            UserAction {
                details,
                ..UserAction::new(action, resource, success)
            },
        );
    }

    /// Build the complete event for `action` as of now.
    pub fn build_event(&self, action: UserAction) -> AuditEvent {
        let config = self.context.config();
        let session_id = Some(config.session_id.clone()).filter(|id| !id.is_empty());

        AuditEvent {
            timestamp: timestamp_from_millis(self.context.now_ms()),
            user_id: self.current_user_id(),
            action: action.action,
            resource: action.resource,
            success: action.success,
            details: action.details.as_ref().map(redact_context),
            ip_address: action.ip_address,
            user_agent: config.user_agent.clone(),
            session_id,
        }
    }

    /// Deliver an event and wait for the outcome.
    pub async fn send(&self, event: &AuditEvent) -> Result<(), TransportError> {
        let body = serde_json::to_value(event)
            .map_err(|e| TransportError::Serialization(e.to_string()))?;
        self.dispatcher
            .deliver(&self.context.config().audit_log_url(), &body)
            .await
    }

    fn record(&self, category: Category, action: UserAction) {
        let event = self.build_event(action);
        AUDIT_EVENTS.with_label_values(&[category.label()]).inc();
        info!(
            target: "audit",
            action = %event.action,
            resource = %event.resource,
            success = event.success,
            user_id = %event.user_id,
            "Audit event"
        );

        match serde_json::to_value(&event) {
            Ok(body) => {
                self.dispatcher
                    .spawn(self.context.config().audit_log_url(), body);
            }
            Err(e) => tracing::debug!(error = %e, "Audit event not serializable"),
        }
    }

    /// `id` of the cached user profile, or `anonymous`.
    fn current_user_id(&self) -> String {
        self.context
            .store()
            .get(StorageKey::UserData)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .and_then(|user| match user.get("id") {
                Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| ANONYMOUS_USER.to_string())
    }
}
