//! redis-docsearch library
//!
//! Generates customer and event JSON documents, stores them in Redis with
//! the JSON module, indexes them with the Search module and queries or
//! samples them back out.
//!
//! # Crates
//!
//! - `docsearch_core` - document classes, index definitions, producers
//! - `docsearch_store` - the `DocumentStore` trait, Redis and in-memory stores
//! - `docsearch_search` - query compilation, index creation, search execution
//! - `docsearch_generator` - deterministic customer and event documents
//! - `docsearch_ingest` - bounded-concurrency bulk writes
//! - `docsearch_sample` - random sampling into CSV
//!
//! # CLI Usage
//!
//! ```bash
//! # Store 10k customers and build the indexes
//! redis-docsearch store-customers 10000 --concurrency 8
//! redis-docsearch create-indexes
//!
//! # Search by indexed alias
//! redis-docsearch search-customers email=ana.costa12@example.com --limit 5
//!
//! # Export a 5% sample of events
//! redis-docsearch sample-to-csv --type event --percent 5 --output events.csv
//! ```

use clap::Parser;
use docsearch_store::{RedisStore, StoreConfig};
use std::time::Duration;

pub mod commands;
pub mod config;
pub mod logging;

pub use config::duration::{parse_duration, parse_duration_arg};
pub use logging::mask_connection_password;

#[derive(Parser, Clone, Debug)]
pub struct StoreOpts {
    /// Redis connection URL
    #[arg(
        long,
        global = true,
        default_value = "redis://localhost:6379/0",
        env = "REDIS_URL"
    )]
    pub redis_url: String,

    /// Maximum number of Redis operations in flight at once
    #[arg(long, global = true, default_value = "512", env = "REDIS_MAX_CONNECTIONS")]
    pub max_connections: usize,

    /// Deadline for establishing the connection (e.g. 500ms, 5s, 1m)
    #[arg(long, global = true, default_value = "5s", value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Deadline for a single command
    #[arg(long, global = true, default_value = "3s", value_parser = parse_duration_arg)]
    pub response_timeout: Duration,

    /// Deadline for obtaining an in-flight slot
    #[arg(long, global = true, default_value = "4s", value_parser = parse_duration_arg)]
    pub pool_timeout: Duration,
}

impl StoreOpts {
    /// Store limits derived from these options.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_in_flight: self.max_connections.max(1),
            connect_timeout: self.connect_timeout,
            response_timeout: self.response_timeout,
            pool_timeout: self.pool_timeout,
            ..StoreConfig::default()
        }
    }

    /// Connect to the configured Redis server.
    pub async fn connect(&self) -> anyhow::Result<RedisStore> {
        use anyhow::Context;

        let masked = mask_connection_password(&self.redis_url);
        tracing::info!("Connecting to Redis at {}", masked);
        RedisStore::connect(&self.redis_url, self.store_config())
            .await
            .with_context(|| format!("Failed to connect to Redis at {masked}"))
    }
}
