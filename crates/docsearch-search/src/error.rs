//! Error types for search operations.

use docsearch_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while building or running a search.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Rejected before any store call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The store failed to run the query.
    #[error("Query failed after {elapsed:?}: {source}")]
    Query {
        #[source]
        source: StoreError,
        elapsed: Duration,
    },

    /// The store answered with a reply that is not a search result.
    #[error("Unexpected search reply after {elapsed:?}: {kind}")]
    UnexpectedReply { kind: String, elapsed: Duration },

    /// Index management failed.
    #[error("Index '{index}' could not be created: {source}")]
    Index {
        index: String,
        #[source]
        source: StoreError,
    },
}

impl SearchError {
    /// Wall-clock time spent before the failure, when a query was issued.
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            SearchError::Query { elapsed, .. } | SearchError::UnexpectedReply { elapsed, .. } => {
                Some(*elapsed)
            }
            _ => None,
        }
    }
}
