//! Fire-and-forget delivery of audit and log entries.
//!
//! Callers never wait on the network. Each delivery runs as a detached tokio
//! task; its error is counted and logged here and goes no further. Failures
//! are reported through `tracing` only, never through the secure log, so a
//! broken sink cannot feed itself.

use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use dealer_telemetry::TRANSPORT_FAILURES;

use crate::domain::errors::TransportError;
use crate::ports::HttpTransport;

/// Remote destination of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Audit,
    SecureLog,
}

impl Sink {
    pub fn label(self) -> &'static str {
        match self {
            Sink::Audit => "audit",
            Sink::SecureLog => "secure_log",
        }
    }
}

/// Warn about the first failure of a sink, log the rest at debug.
#[derive(Debug, Default)]
pub struct FailureLatch {
    tripped: AtomicBool,
}

impl FailureLatch {
    /// Returns true only for the first call.
    fn trip(&self) -> bool {
        !self.tripped.swap(true, Ordering::SeqCst)
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }
}

/// Sender bound to one sink.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn HttpTransport>,
    sink: Sink,
    latch: Arc<FailureLatch>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn HttpTransport>, sink: Sink) -> Self {
        Self {
            transport,
            sink,
            latch: Arc::new(FailureLatch::default()),
        }
    }

    /// POST and wait for the outcome. Failures are recorded, then returned.
    pub async fn deliver(&self, url: &str, body: &Value) -> Result<(), TransportError> {
        let result = self.transport.post_json(url, body).await;
        if let Err(e) = &result {
            self.record_failure(url, e);
        }
        result
    }

    /// POST without waiting.
    ///
    /// Returns `None` when no tokio runtime is available; the entry is dropped.
    pub fn spawn(&self, url: String, body: Value) -> Option<JoinHandle<()>> {
        match Handle::try_current() {
            Ok(handle) => {
                let this = self.clone();
                Some(handle.spawn(async move {
                    let _ = this.deliver(&url, &body).await;
                }))
            }
            Err(_) => {
                debug!(sink = self.sink.label(), "No async runtime, entry dropped");
                None
            }
        }
    }

    pub fn latch(&self) -> &FailureLatch {
        &self.latch
    }

    fn record_failure(&self, url: &str, error: &TransportError) {
        TRANSPORT_FAILURES.with_label_values(&[self.sink.label()]).inc();
        if self.latch.trip() {
            warn!(sink = self.sink.label(), url, error = %error, "Delivery failed, further failures logged at debug");
        } else {
            debug!(sink = self.sink.label(), url, error = %error, "Delivery failed");
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("sink", &self.sink)
            .field("latch", &self.latch)
            .finish_non_exhaustive()
    }
}
