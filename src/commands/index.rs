//! `create-indexes`.

use docsearch_search::create_indexes;
use docsearch_store::DocumentStore;
use serde_json::{json, Value};

/// Drop and recreate the index of every document class.
pub async fn run_create_indexes(store: &dyn DocumentStore) -> anyhow::Result<Value> {
    let outcomes = create_indexes(store).await;

    let mut failed = Vec::new();
    let indexes: Vec<Value> = outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(()) => json!({
                "name": outcome.definition.name,
                "prefix": outcome.definition.prefix,
                "status": "created",
            }),
            Err(e) => {
                failed.push(e.to_string());
                json!({
                    "name": outcome.definition.name,
                    "prefix": outcome.definition.prefix,
                    "status": "error",
                    "error": e.to_string(),
                })
            }
        })
        .collect();

    if !failed.is_empty() {
        anyhow::bail!("{}", failed.join("; "));
    }
    Ok(json!({ "indexes": indexes }))
}
