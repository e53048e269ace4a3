//! Security core wired to recording adapters.

use std::sync::Arc;
use std::time::Duration;

use dealer_security::adapters::{
    ManualActivitySource, ManualClock, MemoryStore, RecordingNavigator, RecordingTransport,
};
use dealer_security::{SecurityConfigOverrides, SecurityCore};
use serde_json::Value;

/// Epoch ms the harness clock starts at (2023-11-14T22:13:20Z).
pub const START_MS: i64 = 1_700_000_000_000;

pub struct TestCore {
    pub core: SecurityCore,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub transport: Arc<RecordingTransport>,
    pub navigator: Arc<RecordingNavigator>,
    pub activity: Arc<ManualActivitySource>,
}

impl TestCore {
    pub fn new(overrides: SecurityConfigOverrides) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(START_MS));
        let transport = Arc::new(RecordingTransport::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let activity = Arc::new(ManualActivitySource::new());

        let core = SecurityCore::builder()
            .overrides(overrides)
            .store(store.clone())
            .clock(clock.clone())
            .transport(transport.clone())
            .navigator(navigator.clone())
            .activity_source(activity.clone())
            .build()
            .expect("test core should build");

        Self {
            core,
            store,
            clock,
            transport,
            navigator,
            activity,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SecurityConfigOverrides::default())
    }

    /// Let spawned deliveries run.
    pub async fn settle(&self) {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    /// Wait for at least `count` requests, failing the test on timeout.
    pub async fn expect_requests(&self, count: usize) {
        assert!(
            self.transport
                .wait_for_requests(count, Duration::from_secs(5))
                .await,
            "expected {} requests, saw {}",
            count,
            self.transport.len()
        );
    }

    pub fn audit_bodies(&self) -> Vec<Value> {
        self.transport.bodies_for("/api/audit/log")
    }

    pub fn log_bodies(&self) -> Vec<Value> {
        self.transport.bodies_for("/api/logs/security")
    }

    /// Number of audit events with the given action.
    pub fn audit_count(&self, action: &str) -> usize {
        self.audit_bodies()
            .iter()
            .filter(|b| b["action"] == action)
            .count()
    }
}
