//! # Dealer Telemetry
//!
//! Logging and metrics for the dashboard security core.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dealer_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DG_SERVICE_NAME` | `dealer-dashboard` | Service name in log lines |
//! | `DG_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `DG_CONSOLE_OUTPUT` | `true` | Write log lines to stdout |
//! | `DG_JSON_LOGS` | `false` (`true` in containers) | One JSON object per line |

#![warn(clippy::all)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingGuard};
pub use metrics::{
    register_metrics, MetricsHandle, AUDIT_EVENTS, DECRYPTION_FAILURES, RATE_LIMIT_REJECTIONS,
    SESSIONS, TRANSPORT_FAILURES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install logging and register metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first: registering is synchronous and cannot conflict with
    // an existing subscriber.
    let metrics = register_metrics()?;
    let logging = init_logging(&config)?;

    Ok(TelemetryGuard {
        _logging: logging,
        metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logging: LoggingGuard,
    metrics: MetricsHandle,
}

impl TelemetryGuard {
    /// Metrics registered by [`init_telemetry`].
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
