//! Adapters layer: production and in-memory implementations of the outbound ports.

pub mod activity;
pub mod cipher;
pub mod clock;
pub mod http;
pub mod memory_store;
pub mod navigator;

pub use activity::ManualActivitySource;
pub use cipher::AesGcmCipher;
pub use clock::{ManualClock, SystemClock};
pub use http::{RecordedRequest, RecordingTransport, ReqwestTransport};
pub use memory_store::MemoryStore;
pub use navigator::{LoggingNavigator, RecordingNavigator, LOGIN_PATH};
