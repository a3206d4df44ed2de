//! The document store abstraction.

use crate::error::StoreError;
use crate::reply::Reply;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde_json::Value;

/// One step of a cursor-based key scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next step; `0` once the scan is complete.
    pub cursor: u64,
    /// Keys returned by this step.
    pub keys: Vec<String>,
}

/// Primitive operations against the document store.
///
/// Implementations are shared across concurrent tasks, so every method takes
/// `&self`.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store `document` under `key`, fully replacing any previous value.
    async fn put(&self, key: &str, document: &Value) -> Result<(), StoreError>;

    /// Read the document stored under `key`.
    ///
    /// Returns [`StoreError::NotFound`] when the key is absent.
    async fn get(&self, key: &str) -> Result<Value, StoreError>;

    /// Run one step of a scan over keys starting with `prefix`.
    async fn scan_page(&self, prefix: &str, cursor: u64) -> Result<ScanPage, StoreError>;

    /// Fetch the raw bodies of `keys` in a single round trip.
    ///
    /// The result has one entry per requested key, in request order; absent
    /// keys carry `None`.
    async fn batch_get(&self, keys: &[String])
        -> Result<Vec<(String, Option<String>)>, StoreError>;

    /// Send an arbitrary command, e.g. index management or search.
    async fn raw_command(&self, args: &[String]) -> Result<Reply, StoreError>;
}

/// Lazily enumerate every key starting with `prefix`.
///
/// Each call starts a fresh scan from cursor `0` and ends when the store
/// reports the cursor back at `0`. Keys may repeat if the keyspace changes
/// while scanning.
pub fn scan_prefix<'a, S>(store: &'a S, prefix: &'a str) -> BoxStream<'a, Result<String, StoreError>>
where
    S: DocumentStore + ?Sized,
{
    stream::try_unfold(Some(0u64), move |cursor| async move {
        let Some(cursor) = cursor else {
            return Ok::<_, StoreError>(None);
        };
        let page = store.scan_page(prefix, cursor).await?;
        let next = (page.cursor != 0).then_some(page.cursor);
        Ok(Some((page.keys, next)))
    })
    .map_ok(|keys| stream::iter(keys.into_iter().map(Ok::<_, StoreError>)))
    .try_flatten()
    .boxed()
}

/// Collect all distinct keys under `prefix`, sorted.
pub async fn collect_keys<S>(store: &S, prefix: &str) -> Result<Vec<String>, StoreError>
where
    S: DocumentStore + ?Sized,
{
    let mut keys: Vec<String> = scan_prefix(store, prefix).try_collect().await?;
    keys.sort_unstable();
    keys.dedup();
    Ok(keys)
}

/// Count the distinct keys under `prefix`.
pub async fn count_keys<S>(store: &S, prefix: &str) -> Result<usize, StoreError>
where
    S: DocumentStore + ?Sized,
{
    Ok(collect_keys(store, prefix).await?.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_scan_prefix_walks_all_pages() {
        let store = MemoryStore::new().with_scan_page_size(3);
        for i in 0..10 {
            store.put(&format!("event:{i}"), &json!({"i": i})).await.unwrap();
        }
        store.put("customer:0", &json!({})).await.unwrap();

        let keys: Vec<String> = scan_prefix(&store, "event:").try_collect().await.unwrap();
        assert_eq!(keys.len(), 10);
        assert!(keys.iter().all(|k| k.starts_with("event:")));
        assert_eq!(store.scan_calls(), 4);
    }

    #[tokio::test]
    async fn test_scan_prefix_is_restartable() {
        let store = MemoryStore::new().with_scan_page_size(2);
        for i in 0..5 {
            store.put(&format!("customer:{i}"), &json!({})).await.unwrap();
        }
        let first = collect_keys(&store, "customer:").await.unwrap();
        let second = collect_keys(&store, "customer:").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[tokio::test]
    async fn test_scan_prefix_empty() {
        let store = MemoryStore::new();
        assert_eq!(count_keys(&store, "event:").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_scan_prefix_propagates_errors() {
        let store = MemoryStore::new().with_failing_scans();
        let result = collect_keys(&store, "event:").await;
        assert!(matches!(result, Err(StoreError::Connection(_))));
    }
}
