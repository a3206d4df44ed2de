//! Bulk ingestion of generated documents.
//!
//! [`BulkIngest`] writes `count` documents of one class under the keys
//! `<class>:0 .. <class>:count-1`. Every write runs as its own task; a
//! semaphore admits at most `concurrency` of them at a time and the caller
//! waits for a free slot before dispatching the next one. All tasks are
//! joined before the run returns, and every failure is kept in the
//! [`IngestReport`].

mod error;
pub mod pipeline;
pub mod report;

pub use error::IngestError;
pub use pipeline::{default_concurrency, pool_size, BulkIngest, DEFAULT_PROGRESS_INTERVAL};
pub use report::IngestReport;
