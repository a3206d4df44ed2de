//! In-process document store.
//!
//! Implements [`DocumentStore`] over a sorted map. Intended for tests and
//! offline runs: it can inject write or scan failures, slow writes down to
//! expose concurrency, and answer raw commands with scripted replies.

use crate::document::encode_document;
use crate::error::StoreError;
use crate::reply::Reply;
use crate::store::{DocumentStore, ScanPage};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const DEFAULT_SCAN_PAGE_SIZE: usize = 1000;

#[derive(Default)]
struct State {
    documents: BTreeMap<String, String>,
    replies: HashMap<String, Result<Reply, String>>,
    commands: Vec<Vec<String>>,
}

/// In-memory [`DocumentStore`].
pub struct MemoryStore {
    state: Mutex<State>,
    scan_page_size: usize,
    write_delay: Option<Duration>,
    fail_writes: bool,
    fail_scans: bool,
    put_attempts: AtomicU64,
    scan_calls: AtomicU64,
    batch_calls: AtomicU64,
    writes_in_flight: AtomicUsize,
    max_writes_in_flight: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            scan_page_size: DEFAULT_SCAN_PAGE_SIZE,
            write_delay: None,
            fail_writes: false,
            fail_scans: false,
            put_attempts: AtomicU64::new(0),
            scan_calls: AtomicU64::new(0),
            batch_calls: AtomicU64::new(0),
            writes_in_flight: AtomicUsize::new(0),
            max_writes_in_flight: AtomicUsize::new(0),
        }
    }

    /// Return at most `size` keys per scan step.
    pub fn with_scan_page_size(mut self, size: usize) -> Self {
        self.scan_page_size = size.max(1);
        self
    }

    /// Hold every write for `delay` before completing it.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// Fail every write.
    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Fail every scan step with a connection error.
    pub fn with_failing_scans(mut self) -> Self {
        self.fail_scans = true;
        self
    }

    /// Answer raw commands named `command` with `reply`.
    pub fn with_reply(self, command: &str, reply: Reply) -> Self {
        self.lock()
            .replies
            .insert(command.to_ascii_uppercase(), Ok(reply));
        self
    }

    /// Reject raw commands named `command` with `message`.
    pub fn with_command_error(self, command: &str, message: &str) -> Self {
        self.lock()
            .replies
            .insert(command.to_ascii_uppercase(), Err(message.to_string()));
        self
    }

    /// Store a raw body under `key` without encoding, e.g. to seed corrupt data.
    pub fn insert_raw(&self, key: &str, body: &str) {
        self.lock()
            .documents
            .insert(key.to_string(), body.to_string());
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.lock().documents.len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `put` calls, successful or not.
    pub fn put_attempts(&self) -> u64 {
        self.put_attempts.load(Ordering::SeqCst)
    }

    /// Highest number of writes observed in flight at the same time.
    pub fn max_writes_in_flight(&self) -> usize {
        self.max_writes_in_flight.load(Ordering::SeqCst)
    }

    /// Number of scan steps served.
    pub fn scan_calls(&self) -> u64 {
        self.scan_calls.load(Ordering::SeqCst)
    }

    /// Number of `batch_get` round trips served.
    pub fn batch_get_calls(&self) -> u64 {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Raw commands received, in arrival order.
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.lock().commands.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn write(&self, key: &str, document: &Value) -> Result<(), StoreError> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes {
            return Err(StoreError::Write {
                key: key.to_string(),
                message: "injected write failure".to_string(),
            });
        }
        let body = encode_document(key, document)?;
        self.lock().documents.insert(key.to_string(), body);
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn put(&self, key: &str, document: &Value) -> Result<(), StoreError> {
        self.put_attempts.fetch_add(1, Ordering::SeqCst);
        let current = self.writes_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_writes_in_flight.fetch_max(current, Ordering::SeqCst);

        let result = self.write(key, document).await;

        self.writes_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn get(&self, key: &str) -> Result<Value, StoreError> {
        let body = self
            .lock()
            .documents
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn scan_page(&self, prefix: &str, cursor: u64) -> Result<ScanPage, StoreError> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_scans {
            return Err(StoreError::Connection("injected scan failure".to_string()));
        }

        let state = self.lock();
        let offset = cursor as usize;
        let matching = state
            .documents
            .keys()
            .filter(|k| k.starts_with(prefix))
            .skip(offset);
        let keys: Vec<String> = matching.take(self.scan_page_size).cloned().collect();

        let next = offset + keys.len();
        let remaining = state
            .documents
            .keys()
            .filter(|k| k.starts_with(prefix))
            .count()
            > next;

        Ok(ScanPage {
            cursor: if remaining { next as u64 } else { 0 },
            keys,
        })
    }

    async fn batch_get(
        &self,
        keys: &[String],
    ) -> Result<Vec<(String, Option<String>)>, StoreError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.lock();
        Ok(keys
            .iter()
            .map(|key| {
                let body = state.documents.get(key).map(|body| format!("[{body}]"));
                (key.clone(), body)
            })
            .collect())
    }

    async fn raw_command(&self, args: &[String]) -> Result<Reply, StoreError> {
        let name = args
            .first()
            .ok_or_else(|| StoreError::command("(empty)", "no command given"))?
            .to_ascii_uppercase();

        let mut state = self.lock();
        state.commands.push(args.to_vec());

        match state.replies.get(&name) {
            Some(Ok(reply)) => Ok(reply.clone()),
            Some(Err(message)) => Err(StoreError::command(&name, message.clone())),
            None => match name.as_str() {
                "FT.CREATE" | "FT.DROPINDEX" => Ok(Reply::Status("OK".to_string())),
                _ => Err(StoreError::command(&name, "unsupported by MemoryStore")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let store = MemoryStore::new();
        let doc = json!({"customerId": "c-1", "primaryIdentifiers": {"email": "a@b.com"}});
        store.put("customer:1", &doc).await.unwrap();
        assert_eq!(store.get("customer:1").await.unwrap(), doc);
    }

    #[tokio::test]
    async fn test_put_replaces_whole_document() {
        let store = MemoryStore::new();
        store.put("event:1", &json!({"a": 1, "b": 2})).await.unwrap();
        store.put("event:1", &json!({"c": 3})).await.unwrap();
        assert_eq!(store.get("event:1").await.unwrap(), json!({"c": 3}));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemoryStore::new();
        let err = store.get("event:404").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let store = MemoryStore::new().with_failing_writes();
        let err = store.put("event:1", &json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert_eq!(store.put_attempts(), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_batch_get_preserves_order_and_absence() {
        let store = MemoryStore::new();
        store.put("event:1", &json!({"n": 1})).await.unwrap();
        store.put("event:3", &json!({"n": 3})).await.unwrap();

        let keys = vec![
            "event:3".to_string(),
            "event:2".to_string(),
            "event:1".to_string(),
        ];
        let results = store.batch_get(&keys).await.unwrap();
        assert_eq!(results[0], ("event:3".to_string(), Some(r#"[{"n":3}]"#.to_string())));
        assert_eq!(results[1], ("event:2".to_string(), None));
        assert_eq!(results[2].0, "event:1");
        assert_eq!(store.batch_get_calls(), 1);
    }

    #[tokio::test]
    async fn test_raw_command_scripted_reply() {
        let store = MemoryStore::new().with_reply("ft.search", Reply::Int(0));
        let args = vec!["FT.SEARCH".to_string(), "idx".to_string(), "*".to_string()];
        assert_eq!(store.raw_command(&args).await.unwrap(), Reply::Int(0));
        assert_eq!(store.commands(), vec![args]);
    }

    #[tokio::test]
    async fn test_raw_command_unsupported() {
        let store = MemoryStore::new();
        let err = store
            .raw_command(&["FLUSHALL".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Command { .. }));
    }
}
