//! # Dealer Guard Test Suite
//!
//! Cross-component flows exercised through the assembled `SecurityCore`
//! with in-memory adapters. Unit tests live next to the code in each crate.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs      # Core wired to recording adapters
//!     ├── session.rs      # Login, idle timeout, logout
//!     ├── rate_limit.rs   # Window limits end to end
//!     ├── encryption.rs   # DataCipher round trips and failures
//!     └── logging.rs      # Audit and secure-log delivery, metrics
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p dealer-tests
//! cargo test -p dealer-tests integration::session
//! ```

#![allow(dead_code)]

pub mod integration;
