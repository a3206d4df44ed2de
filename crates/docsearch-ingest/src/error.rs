//! Error types for bulk ingestion.

use docsearch_store::StoreError;
use thiserror::Error;

/// A single document that could not be stored.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The store rejected the write.
    #[error("Failed to store document {index} at '{key}': {source}")]
    Write {
        index: u64,
        key: String,
        #[source]
        source: StoreError,
    },

    /// The worker task died before finishing the write.
    #[error("Worker for document {index} at '{key}' did not complete: {message}")]
    WorkerPanicked {
        index: u64,
        key: String,
        message: String,
    },
}

impl IngestError {
    /// Key of the document that failed.
    pub fn key(&self) -> &str {
        match self {
            IngestError::Write { key, .. } | IngestError::WorkerPanicked { key, .. } => key,
        }
    }

    /// Index of the document that failed.
    pub fn index(&self) -> u64 {
        match self {
            IngestError::Write { index, .. } | IngestError::WorkerPanicked { index, .. } => *index,
        }
    }
}
