//! Prometheus metrics for the security core.
//!
//! All metrics follow the naming convention: `dg_<concern>_<metric>_total`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Requests rejected by the fixed-window rate limiter
    pub static ref RATE_LIMIT_REJECTIONS: CounterVec = CounterVec::new(
        Opts::new("dg_rate_limit_rejections_total", "Requests rejected by the rate limiter"),
        &["scope"]
    ).expect("metric creation failed");

    /// Session lifecycle transitions
    pub static ref SESSIONS: CounterVec = CounterVec::new(
        Opts::new("dg_sessions_total", "Session lifecycle transitions"),
        &["outcome"]  // started / ended / expired
    ).expect("metric creation failed");

    /// Audit events handed to the transport
    pub static ref AUDIT_EVENTS: CounterVec = CounterVec::new(
        Opts::new("dg_audit_events_total", "Audit events dispatched"),
        &["category"]  // user / security / auth / data
    ).expect("metric creation failed");

    /// Fire-and-forget network sends that failed
    pub static ref TRANSPORT_FAILURES: CounterVec = CounterVec::new(
        Opts::new("dg_transport_failures_total", "Failed audit or log deliveries"),
        &["sink"]  // audit / secure_log
    ).expect("metric creation failed");

    /// Decryption attempts that failed authentication or parsing
    pub static ref DECRYPTION_FAILURES: Counter = Counter::new(
        "dg_decryption_failures_total",
        "Decryption attempts that failed closed"
    ).expect("metric creation failed");
}

/// Handle for the registered metrics.
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    /// Render all registered metrics in the text exposition format.
    pub fn gather_text(&self) -> Result<String, TelemetryError> {
        encode_registry(&self.registry)
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; collectors that are already registered are
/// skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(RATE_LIMIT_REJECTIONS.clone()),
        Box::new(SESSIONS.clone()),
        Box::new(AUDIT_EVENTS.clone()),
        Box::new(TRANSPORT_FAILURES.clone()),
        Box::new(DECRYPTION_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode the global registry in Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    encode_registry(&REGISTRY)
}

fn encode_registry(registry: &Registry) -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
