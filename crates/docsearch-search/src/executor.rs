//! Paginated search execution and reply decoding.

use crate::error::SearchError;
use crate::query::{compile_query, FilterSet};
use docsearch_core::DocumentClass;
use docsearch_store::{DocumentStore, Reply};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Field name under which the full document body is returned.
const BODY_FIELD: &str = "$";

/// Limit/offset of a search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Maximum number of documents to return; at least 1.
    pub limit: u64,
    /// Number of matches to skip.
    pub offset: u64,
}

impl Pagination {
    /// Default page size.
    pub const DEFAULT_LIMIT: u64 = 10;

    /// Validate caller-supplied values.
    pub fn new(limit: i64, offset: i64) -> Result<Self, SearchError> {
        if limit < 1 {
            return Err(SearchError::Validation(
                "limit must be a positive integer".to_string(),
            ));
        }
        if offset < 0 {
            return Err(SearchError::Validation(
                "offset must be a non-negative integer".to_string(),
            ));
        }
        Ok(Self {
            limit: limit as u64,
            offset: offset as u64,
        })
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.limit < 1 {
            return Err(SearchError::Validation(
                "limit must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Documents returned by one search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    /// Documents in the order the store ranked them.
    pub documents: Vec<Value>,
    /// Compiled query string that was sent.
    pub query: String,
    /// Total matches reported by the store, when present in the reply.
    pub total: Option<u64>,
    /// Result entries dropped because their shape was unexpected.
    pub skipped: usize,
    /// Wall-clock time of the query round trip and decoding.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SearchResults {
    /// Elapsed time in microseconds, for reporting.
    pub fn elapsed_micros(&self) -> u128 {
        self.elapsed.as_micros()
    }
}

/// Runs compiled queries against a store.
pub struct SearchExecutor<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> SearchExecutor<'a, S>
where
    S: DocumentStore + ?Sized,
{
    /// Create an executor over `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Search the index of `class`, rejecting filters on unknown aliases.
    pub async fn search_class(
        &self,
        class: DocumentClass,
        filters: &FilterSet,
        page: Pagination,
    ) -> Result<SearchResults, SearchError> {
        filters.validate_for(&class.index())?;
        self.search(class.index_name(), filters, page).await
    }

    /// Search `index` with `filters`, returning one page of documents.
    ///
    /// Entries whose shape does not match a search result are skipped. No
    /// matches yields an empty result, not an error.
    pub async fn search(
        &self,
        index: &str,
        filters: &FilterSet,
        page: Pagination,
    ) -> Result<SearchResults, SearchError> {
        page.validate()?;

        let query = compile_query(filters);
        let args = vec![
            "FT.SEARCH".to_string(),
            index.to_string(),
            query.clone(),
            "LIMIT".to_string(),
            page.offset.to_string(),
            page.limit.to_string(),
            "RETURN".to_string(),
            "1".to_string(),
            BODY_FIELD.to_string(),
        ];
        debug!(
            "FT.SEARCH {} {} (offset {}, limit {})",
            index, query, page.offset, page.limit
        );

        let start = Instant::now();
        let reply = self
            .store
            .raw_command(&args)
            .await
            .map_err(|source| SearchError::Query {
                source,
                elapsed: start.elapsed(),
            })?;

        let mut results =
            decode_search_reply(&reply).map_err(|kind| SearchError::UnexpectedReply {
                kind,
                elapsed: start.elapsed(),
            })?;
        results.elapsed = start.elapsed();
        results.query = query;

        if results.skipped > 0 {
            warn!(
                "Skipped {} malformed result entries from {}",
                results.skipped, index
            );
        }
        debug!(
            "Search on {} returned {} documents in {:?}",
            index,
            results.documents.len(),
            results.elapsed
        );
        Ok(results)
    }
}

/// Decode a search reply in either protocol shape.
///
/// - map shape: `{total_results, results: [{id, extra_attributes: {$: body}}]}`
/// - array shape: `[total, key, [field, value, ...], key, [...], ...]`
///
/// Returns the reply's kind as the error when it is neither.
pub fn decode_search_reply(reply: &Reply) -> Result<SearchResults, String> {
    match reply {
        Reply::Map(_) => Ok(decode_map_reply(reply)),
        Reply::Array(items) => Ok(decode_array_reply(items)),
        other => Err(other.kind().to_string()),
    }
}

fn decode_map_reply(reply: &Reply) -> SearchResults {
    let mut results = SearchResults {
        total: reply
            .map_get("total_results")
            .and_then(Reply::as_int)
            .and_then(|n| u64::try_from(n).ok()),
        ..Default::default()
    };

    let Some(entries) = reply.map_get("results").and_then(Reply::as_array) else {
        return results;
    };

    for entry in entries {
        let body = entry
            .map_get("extra_attributes")
            .and_then(|attrs| attrs.map_get(BODY_FIELD))
            .and_then(Reply::as_text);
        push_body(&mut results, body);
    }
    results
}

fn decode_array_reply(items: &[Reply]) -> SearchResults {
    let mut results = SearchResults::default();
    let Some((total, rest)) = items.split_first() else {
        return results;
    };
    results.total = total.as_int().and_then(|n| u64::try_from(n).ok());

    for pair in rest.chunks(2) {
        let body = match pair {
            [_key, Reply::Array(fields)] => fields
                .chunks(2)
                .find(|f| f.first().and_then(Reply::as_text) == Some(BODY_FIELD))
                .and_then(|f| f.get(1))
                .and_then(Reply::as_text),
            _ => None,
        };
        push_body(&mut results, body);
    }
    results
}

fn push_body(results: &mut SearchResults, body: Option<&str>) {
    match body.map(serde_json::from_str::<Value>) {
        Some(Ok(document)) => results.documents.push(document),
        _ => results.skipped += 1,
    }
}
