//! Subcommand handlers.
//!
//! Each handler takes an already-connected store and returns the JSON value
//! the binary prints, so handlers can run against a `MemoryStore` in tests.

pub mod index;
pub mod inspect;
pub mod sample;
pub mod search;
pub mod store;

use std::time::Duration;

/// Milliseconds as reported in command output.
pub(crate) fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
