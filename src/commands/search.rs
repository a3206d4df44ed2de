//! `search-customers` / `search-events`.

use anyhow::Context;
use clap::Args;
use docsearch_core::DocumentClass;
use docsearch_search::{FilterSet, Pagination, SearchExecutor};
use docsearch_store::DocumentStore;
use serde_json::{json, Value};

#[derive(Args, Clone, Debug)]
pub struct SearchArgs {
    /// Filters as alias=value, e.g. email=a@b.com (arguments without '=' are ignored)
    #[arg(value_name = "ALIAS=VALUE")]
    pub filters: Vec<String>,

    /// Maximum number of documents to return
    #[arg(long, default_value = "10", allow_negative_numbers = true)]
    pub limit: i64,

    /// Number of matches to skip
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub offset: i64,
}

/// Search the index of `class` with the filters in `args`.
pub async fn run_search(
    store: &dyn DocumentStore,
    class: DocumentClass,
    args: &SearchArgs,
) -> anyhow::Result<Value> {
    let page = Pagination::new(args.limit, args.offset)?;
    let filters = FilterSet::from_args(&args.filters);

    let results = SearchExecutor::new(store)
        .search_class(class, &filters, page)
        .await
        .with_context(|| format!("Search on {} failed", class.index_name()))?;

    Ok(json!({
        "index": class.index_name(),
        "query": results.query,
        "limit": page.limit,
        "offset": page.offset,
        "total": results.total,
        "count": results.documents.len(),
        "results": results.documents,
        "query_time_ms": super::millis(results.elapsed),
    }))
}
