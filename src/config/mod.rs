//! Configuration helpers for the CLI.

pub mod duration;
