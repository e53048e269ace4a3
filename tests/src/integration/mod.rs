//! Integration flows.

pub mod harness;

mod encryption;
mod logging;
mod rate_limit;
mod session;
