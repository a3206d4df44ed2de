//! Document store client for redis-docsearch.
//!
//! The [`DocumentStore`] trait is the only seam between the pipelines and the
//! backend. Two implementations ship with this crate:
//!
//! - [`RedisStore`] - Redis with the JSON and Search modules, over a shared
//!   multiplexed connection with a bounded number of in-flight operations
//! - [`MemoryStore`] - an in-process store used by tests, with failure
//!   injection and scripted command replies
//!
//! # Example
//!
//! ```ignore
//! use docsearch_store::{collect_keys, DocumentStore, RedisStore, StoreConfig};
//!
//! let store = RedisStore::connect("redis://localhost:6379/0", StoreConfig::default()).await?;
//! store.put("customer:0", &serde_json::json!({"customerId": "c-1"})).await?;
//! let keys = collect_keys(&store, "customer:").await?;
//! ```

mod document;
mod error;
mod info;
pub mod memory;
mod redis_store;
mod reply;
mod store;

pub use document::{decode_document, decode_root_read, encode_document, unwrap_envelope};
pub use error::StoreError;
pub use info::MemoryInfo;
pub use memory::MemoryStore;
pub use redis_store::{RedisStore, StoreConfig};
pub use reply::Reply;
pub use store::{collect_keys, count_keys, scan_prefix, DocumentStore, ScanPage};
