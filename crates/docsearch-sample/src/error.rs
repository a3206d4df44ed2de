//! Error types for sampling and export.

use docsearch_store::StoreError;
use thiserror::Error;

/// Errors that can occur while sampling documents to CSV.
#[derive(Error, Debug)]
pub enum SampleError {
    /// Percent outside `1..=100`.
    #[error("Validation error: percent must be between 1 and 100, got {0}")]
    InvalidPercent(i64),

    /// No stored key matches the class prefix.
    #[error("No keys found for pattern {0}*")]
    NoKeys(String),

    /// Scanning or fetching failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The output could not be created or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
