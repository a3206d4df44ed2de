//! Redis-backed document store.

use crate::document::{decode_root_read, encode_document};
use crate::error::StoreError;
use crate::reply::Reply;
use crate::store::{DocumentStore, ScanPage};
use redis::aio::MultiplexedConnection;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info};

/// Default upper bound on simultaneous in-flight operations.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 512;

/// Number of keys requested per `SCAN` step.
pub const DEFAULT_SCAN_COUNT: usize = 1000;

/// Connection and resource limits for [`RedisStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of operations in flight at once.
    pub max_in_flight: usize,
    /// Deadline for establishing the connection.
    pub connect_timeout: Duration,
    /// Deadline for a single command (write plus read of the reply).
    pub response_timeout: Duration,
    /// Deadline for obtaining an in-flight slot.
    pub pool_timeout: Duration,
    /// `COUNT` hint passed to each `SCAN` step.
    pub scan_count: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            connect_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(3),
            pool_timeout: Duration::from_secs(4),
            scan_count: DEFAULT_SCAN_COUNT,
        }
    }
}

/// Document store over a Redis server with the JSON and Search modules.
///
/// Cloning is cheap: clones share the underlying multiplexed connection and
/// the in-flight limit.
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
    slots: Arc<Semaphore>,
    config: StoreConfig,
    database: i64,
}

impl RedisStore {
    /// Connect to the server at `url` and verify it answers `PING`.
    ///
    /// # Arguments
    ///
    /// * `url` - Connection URL, e.g. `redis://:password@localhost:6379/0`
    /// * `config` - Resource limits and timeouts
    pub async fn connect(url: &str, config: StoreConfig) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
        let database = client.get_connection_info().redis.db;

        let connection = timeout(
            config.connect_timeout,
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| StoreError::Timeout {
            operation: "connect".to_string(),
            after: config.connect_timeout,
        })?
        .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self {
            connection,
            slots: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            config,
            database,
        };

        let pong: redis::Value = store
            .run("PING", |mut conn| async move {
                redis::cmd("PING").query_async(&mut conn).await
            })
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        debug!("PING answered with {:?}", pong);

        info!(
            "Connected to Redis database {} (max in flight: {})",
            store.database, store.config.max_in_flight
        );
        Ok(store)
    }

    /// Logical database index selected by the connection URL.
    pub fn database(&self) -> i64 {
        self.database
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Run `op` on a connection handle once an in-flight slot is available,
    /// bounded by the response timeout.
    async fn run<T, F, Fut>(&self, operation: &str, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        self.run_with_deadline(operation, self.config.response_timeout, op)
            .await
    }

    /// Like [`run`](Self::run), with an explicit deadline for the reply.
    async fn run_with_deadline<T, F, Fut>(
        &self,
        operation: &str,
        deadline: Duration,
        op: F,
    ) -> Result<T, StoreError>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        let _slot = timeout(self.config.pool_timeout, self.slots.acquire())
            .await
            .map_err(|_| StoreError::Timeout {
                operation: format!("{operation} (waiting for a free connection slot)"),
                after: self.config.pool_timeout,
            })?
            .map_err(|_| StoreError::Connection("connection pool closed".to_string()))?;

        timeout(deadline, op(self.connection.clone()))
            .await
            .map_err(|_| StoreError::Timeout {
                operation: operation.to_string(),
                after: deadline,
            })?
            .map_err(|e| classify(operation, e))
    }
}

/// Deadline for a pipeline of `replies` commands: the response timeout once
/// per reply, so a server that keeps answering never trips it.
pub(crate) fn pipeline_deadline(response_timeout: Duration, replies: usize) -> Duration {
    let replies = u32::try_from(replies.max(1)).unwrap_or(u32::MAX);
    response_timeout.saturating_mul(replies)
}

/// Map a driver error to the store taxonomy.
fn classify(operation: &str, err: redis::RedisError) -> StoreError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        StoreError::Connection(err.to_string())
    } else if err.is_timeout() {
        StoreError::Timeout {
            operation: operation.to_string(),
            after: Duration::ZERO,
        }
    } else {
        StoreError::command(operation, err.to_string())
    }
}

#[async_trait::async_trait]
impl DocumentStore for RedisStore {
    async fn put(&self, key: &str, document: &Value) -> Result<(), StoreError> {
        let body = encode_document(key, document)?;
        let mut cmd = redis::cmd("JSON.SET");
        cmd.arg(key).arg("$").arg(body);

        let result: Result<redis::Value, StoreError> = self
            .run("JSON.SET", |mut conn| async move {
                cmd.query_async(&mut conn).await
            })
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(StoreError::Command { message, .. }) => Err(StoreError::Write {
                key: key.to_string(),
                message,
            }),
            Err(other) => Err(other),
        }
    }

    async fn get(&self, key: &str) -> Result<Value, StoreError> {
        let mut cmd = redis::cmd("JSON.GET");
        cmd.arg(key).arg("$");

        let reply: redis::Value = self
            .run("JSON.GET", |mut conn| async move {
                cmd.query_async(&mut conn).await
            })
            .await?;

        match Reply::from(reply) {
            Reply::Nil => Err(StoreError::NotFound(key.to_string())),
            reply => {
                let raw = reply.as_text().ok_or_else(|| StoreError::UnexpectedReply {
                    command: "JSON.GET".to_string(),
                    reply: reply.to_string(),
                })?;
                decode_root_read(raw)?
                    .ok_or_else(|| StoreError::NotFound(key.to_string()))
            }
        }
    }

    async fn scan_page(&self, prefix: &str, cursor: u64) -> Result<ScanPage, StoreError> {
        let mut cmd = redis::cmd("SCAN");
        cmd.arg(cursor)
            .arg("MATCH")
            .arg(format!("{prefix}*"))
            .arg("COUNT")
            .arg(self.config.scan_count);

        let reply: redis::Value = self
            .run("SCAN", |mut conn| async move {
                cmd.query_async(&mut conn).await
            })
            .await?;

        parse_scan_reply(Reply::from(reply))
    }

    async fn batch_get(
        &self,
        keys: &[String],
    ) -> Result<Vec<(String, Option<String>)>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for key in keys {
            pipe.cmd("JSON.GET").arg(key).arg("$");
        }

        let deadline = pipeline_deadline(self.config.response_timeout, keys.len());
        let replies: Vec<redis::Value> = self
            .run_with_deadline("JSON.GET (pipeline)", deadline, |mut conn| async move {
                pipe.query_async(&mut conn).await
            })
            .await?;

        if replies.len() != keys.len() {
            return Err(StoreError::UnexpectedReply {
                command: "JSON.GET (pipeline)".to_string(),
                reply: format!("{} replies for {} keys", replies.len(), keys.len()),
            });
        }

        Ok(keys
            .iter()
            .cloned()
            .zip(replies.into_iter().map(|v| match Reply::from(v) {
                Reply::Nil => None,
                reply => reply.as_text().map(str::to_string),
            }))
            .collect())
    }

    async fn raw_command(&self, args: &[String]) -> Result<Reply, StoreError> {
        let (name, rest) = args
            .split_first()
            .ok_or_else(|| StoreError::command("(empty)", "no command given"))?;
        let mut cmd = redis::cmd(name);
        for arg in rest {
            cmd.arg(arg);
        }

        let reply: redis::Value = self
            .run(name, |mut conn| async move {
                cmd.query_async(&mut conn).await
            })
            .await?;
        Ok(Reply::from(reply))
    }
}

/// Decode a `SCAN` reply: `[cursor, [key, ...]]`.
pub(crate) fn parse_scan_reply(reply: Reply) -> Result<ScanPage, StoreError> {
    let unexpected = |reply: &Reply| StoreError::UnexpectedReply {
        command: "SCAN".to_string(),
        reply: reply.to_string(),
    };

    let items = reply.as_array().ok_or_else(|| unexpected(&reply))?;
    let [cursor, keys] = items else {
        return Err(unexpected(&reply));
    };
    let cursor = cursor
        .as_int()
        .and_then(|c| u64::try_from(c).ok())
        .ok_or_else(|| unexpected(&reply))?;
    let keys = keys
        .as_array()
        .ok_or_else(|| unexpected(&reply))?
        .iter()
        .filter_map(|k| k.as_text().map(str::to_string))
        .collect();

    Ok(ScanPage { cursor, keys })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.max_in_flight, 512);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.response_timeout, Duration::from_secs(3));
        assert_eq!(config.pool_timeout, Duration::from_secs(4));
    }

    #[test]
    fn test_parse_scan_reply() {
        let reply = Reply::Array(vec![
            Reply::Text("17".to_string()),
            Reply::Array(vec![
                Reply::Text("event:1".to_string()),
                Reply::Text("event:2".to_string()),
            ]),
        ]);
        let page = parse_scan_reply(reply).unwrap();
        assert_eq!(page.cursor, 17);
        assert_eq!(page.keys, vec!["event:1", "event:2"]);
    }

    #[test]
    fn test_parse_scan_reply_rejects_bad_shape() {
        let result = parse_scan_reply(Reply::Text("0".to_string()));
        assert!(matches!(result, Err(StoreError::UnexpectedReply { .. })));

        let result = parse_scan_reply(Reply::Array(vec![Reply::Int(0)]));
        assert!(matches!(result, Err(StoreError::UnexpectedReply { .. })));
    }

    #[test]
    fn test_pipeline_deadline_scales_with_replies() {
        let per_reply = Duration::from_secs(3);
        assert_eq!(pipeline_deadline(per_reply, 0), per_reply);
        assert_eq!(pipeline_deadline(per_reply, 1), per_reply);
        assert_eq!(pipeline_deadline(per_reply, 50), Duration::from_secs(150));
    }

    /// Minimal RESP server: answers `JSON.GET` after `reply_delay`, one
    /// command at a time, and acknowledges everything else.
    async fn spawn_slow_server(reply_delay: Duration) -> String {
        use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let (read, mut write) = socket.into_split();
                    let mut reader = BufReader::new(read);
                    loop {
                        let mut line = String::new();
                        if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                            return;
                        }
                        let Some(count) = line.trim().strip_prefix('*') else {
                            return;
                        };
                        let count: usize = count.parse().unwrap();
                        let mut args = Vec::with_capacity(count);
                        for _ in 0..count {
                            line.clear();
                            reader.read_line(&mut line).await.unwrap();
                            let len: usize = line.trim()[1..].parse().unwrap();
                            let mut buf = vec![0u8; len + 2];
                            reader.read_exact(&mut buf).await.unwrap();
                            buf.truncate(len);
                            args.push(String::from_utf8(buf).unwrap());
                        }

                        let reply = match args[0].to_ascii_uppercase().as_str() {
                            "PING" => "+PONG\r\n".to_string(),
                            "JSON.GET" => {
                                tokio::time::sleep(reply_delay).await;
                                let body = format!(r#"[{{"key":"{}"}}]"#, args[1]);
                                format!("${}\r\n{}\r\n", body.len(), body)
                            }
                            _ => "+OK\r\n".to_string(),
                        };
                        if write.write_all(reply.as_bytes()).await.is_err() {
                            return;
                        }
                    }
                });
            }
        });

        format!("redis://{addr}/0")
    }

    #[tokio::test]
    async fn test_batch_get_outlasts_single_response_timeout() {
        let url = spawn_slow_server(Duration::from_millis(30)).await;
        let config = StoreConfig {
            response_timeout: Duration::from_millis(200),
            ..StoreConfig::default()
        };
        let store = RedisStore::connect(&url, config).await.unwrap();

        // 20 replies 30ms apart take well over one response timeout in total.
        let keys: Vec<String> = (0..20).map(|i| format!("event:{i}")).collect();
        let fetched = store.batch_get(&keys).await.unwrap();

        assert_eq!(fetched.len(), 20);
        assert_eq!(fetched[7].0, "event:7");
        let body = fetched[7].1.as_deref().unwrap();
        assert_eq!(
            decode_root_read(body).unwrap(),
            Some(serde_json::json!({"key": "event:7"}))
        );
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let result = RedisStore::connect("not a url", StoreConfig::default()).await;
        assert!(matches!(result, Err(StoreError::InvalidUrl(_))));
    }
}
