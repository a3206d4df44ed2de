//! `get`, `random`, `health`, and the `customer` / `event` printers.

use anyhow::Context;
use docsearch_core::DocumentClass;
use docsearch_generator::DocumentGenerator;
use docsearch_store::{collect_keys, count_keys, DocumentStore, MemoryInfo};
use rand::seq::IndexedRandom;
use serde_json::{json, Map, Value};
use std::time::Instant;

/// Fetch one document by key.
pub async fn run_get(store: &dyn DocumentStore, key: &str) -> anyhow::Result<Value> {
    let start = Instant::now();
    let document = store
        .get(key)
        .await
        .with_context(|| format!("Failed to get document '{key}'"))?;
    Ok(json!({
        "key": key,
        "document": document,
        "query_time_ms": super::millis(start.elapsed()),
    }))
}

/// Fetch a uniformly chosen stored document of `class`.
pub async fn run_random(store: &dyn DocumentStore, class: DocumentClass) -> anyhow::Result<Value> {
    let keys = collect_keys(store, class.prefix())
        .await
        .with_context(|| format!("Failed to list {class} keys"))?;
    let Some(key) = keys.choose(&mut rand::rng()) else {
        anyhow::bail!("No {class} documents found");
    };
    store
        .get(key)
        .await
        .with_context(|| format!("Failed to get document '{key}'"))
}

/// Key counts per class, memory usage and index definitions.
///
/// `redis_url` should already be masked. Memory info is omitted when the
/// store does not answer `INFO memory`.
pub async fn run_health(
    store: &dyn DocumentStore,
    redis_url: &str,
    database: i64,
) -> anyhow::Result<Value> {
    let start = Instant::now();

    let mut counts = Map::new();
    for class in DocumentClass::ALL {
        let count = count_keys(store, class.prefix())
            .await
            .with_context(|| format!("Failed to count {class} keys"))?;
        counts.insert(format!("{class}_count"), json!(count));
    }

    let memory = match store
        .raw_command(&["INFO".to_string(), "memory".to_string()])
        .await
    {
        Ok(reply) => reply.as_text().map(MemoryInfo::parse),
        Err(e) => {
            tracing::warn!("INFO memory failed: {}", e);
            None
        }
    };

    let indexes: Vec<_> = DocumentClass::ALL.iter().map(|c| c.index()).collect();

    let mut output = Map::new();
    output.insert("status".to_string(), json!("ok"));
    output.insert("redis_url".to_string(), json!(redis_url));
    output.insert("db_index".to_string(), json!(database));
    output.extend(counts);
    output.insert("redis_memory".to_string(), json!(memory));
    output.insert("indexes".to_string(), json!(indexes));
    output.insert(
        "query_time_ms".to_string(),
        json!(super::millis(start.elapsed())),
    );
    Ok(Value::Object(output))
}

/// One freshly generated document of `class`, not stored.
pub fn run_print(class: DocumentClass, seed: Option<u64>) -> Value {
    let generator = match seed {
        Some(seed) => DocumentGenerator::new(class, seed),
        None => DocumentGenerator::unseeded(class),
    };
    generator.generate(0)
}
