//! Ports layer.

pub mod outbound;

pub use outbound::{
    ActivityHandler, ActivitySource, Cipher, Clock, HttpTransport, KeyValueStore, ListenerId,
    Navigator,
};
