//! Outcome of an ingestion run.

use crate::error::IngestError;
use docsearch_core::DocumentClass;
use std::time::Duration;

/// Counts and failures from one [`BulkIngest`](crate::BulkIngest) run.
#[derive(Debug)]
pub struct IngestReport {
    /// Document class written.
    pub class: DocumentClass,
    /// Number of documents requested.
    pub requested: u64,
    /// Number of documents written successfully.
    pub stored: u64,
    /// Every failed write, ordered by document index.
    pub failures: Vec<IngestError>,
    /// Number of writes allowed in flight at once.
    pub concurrency: usize,
    /// Wall-clock time of the run.
    pub duration: Duration,
}

impl IngestReport {
    /// True when every requested document was stored.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// A representative failure, the one with the lowest index.
    pub fn first_error(&self) -> Option<&IngestError> {
        self.failures.first()
    }

    /// Number of failed writes.
    pub fn failed(&self) -> u64 {
        self.failures.len() as u64
    }

    /// Calculate stored documents per second.
    pub fn docs_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.stored as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}
