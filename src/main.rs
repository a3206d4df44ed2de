//! Command-line interface for redis-docsearch
//!
//! # Usage Examples
//!
//! ## Populate
//! ```bash
//! # Store 1000 customers (default) and 50k events with a fixed seed
//! redis-docsearch store-customers
//! redis-docsearch store-events 50000 --seed 42 --concurrency 16
//!
//! # (Re)build both search indexes
//! redis-docsearch create-indexes
//! ```
//!
//! ## Query
//! ```bash
//! redis-docsearch search-events visitor_id=abc call_id=call_x1y2z --limit 20
//! redis-docsearch get --key customer:17
//! redis-docsearch random --type event
//! redis-docsearch health
//! ```
//!
//! ## Export
//! ```bash
//! redis-docsearch sample-to-csv --type customer --percent 5 --output customers.csv
//! ```
//!
//! Connection settings come from `--redis-url` / `REDIS_URL` and friends and
//! may be given before or after the subcommand.

use clap::{Parser, Subcommand};
use docsearch_core::DocumentClass;
use docsearch_store::DocumentStore;
use redis_docsearch::commands::{index, inspect, sample, search, store};
use redis_docsearch::{mask_connection_password, StoreOpts};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "redis-docsearch")]
#[command(about = "Generate, index, search and sample JSON documents in Redis")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    store_opts: StoreOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and store customer documents under customer:0..COUNT-1
    StoreCustomers {
        #[command(flatten)]
        args: store::StoreArgs,
    },

    /// Generate and store event documents under event:0..COUNT-1
    StoreEvents {
        #[command(flatten)]
        args: store::StoreArgs,
    },

    /// Drop and recreate the customer and event search indexes
    CreateIndexes,

    /// Search customers by indexed alias (email, phone, visitor_id)
    SearchCustomers {
        #[command(flatten)]
        args: search::SearchArgs,
    },

    /// Search events by indexed alias (visitor_id, call_id, chat_id, ...)
    SearchEvents {
        #[command(flatten)]
        args: search::SearchArgs,
    },

    /// Write a random sample of stored documents to a CSV file
    SampleToCsv {
        #[command(flatten)]
        args: sample::SampleArgs,
    },

    /// Print the document stored at a key
    Get {
        /// Full key, e.g. customer:42
        #[arg(long)]
        key: String,
    },

    /// Print a randomly chosen stored document
    Random {
        /// Document class
        #[arg(long = "type", value_enum)]
        class: DocumentClass,
    },

    /// Print key counts, memory usage and index definitions
    Health,

    /// Print a generated customer document without storing it
    Customer {
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print a generated event document without storing it
    Event {
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let opts = cli.store_opts;

    let output = match cli.command {
        Commands::Customer { seed } => inspect::run_print(DocumentClass::Customer, seed),
        Commands::Event { seed } => inspect::run_print(DocumentClass::Event, seed),
        Commands::StoreCustomers { args } => {
            let store: Arc<dyn DocumentStore> = Arc::new(opts.connect().await?);
            store::run_store(store, DocumentClass::Customer, &args).await?
        }
        Commands::StoreEvents { args } => {
            let store: Arc<dyn DocumentStore> = Arc::new(opts.connect().await?);
            store::run_store(store, DocumentClass::Event, &args).await?
        }
        Commands::CreateIndexes => {
            let store = opts.connect().await?;
            index::run_create_indexes(&store).await?
        }
        Commands::SearchCustomers { args } => {
            let store = opts.connect().await?;
            search::run_search(&store, DocumentClass::Customer, &args).await?
        }
        Commands::SearchEvents { args } => {
            let store = opts.connect().await?;
            search::run_search(&store, DocumentClass::Event, &args).await?
        }
        Commands::SampleToCsv { args } => {
            let store = opts.connect().await?;
            sample::run_sample(&store, &args).await?
        }
        Commands::Get { key } => {
            let store = opts.connect().await?;
            inspect::run_get(&store, &key).await?
        }
        Commands::Random { class } => {
            let store = opts.connect().await?;
            inspect::run_random(&store, class).await?
        }
        Commands::Health => {
            let store = opts.connect().await?;
            let url = mask_connection_password(&opts.redis_url);
            inspect::run_health(&store, &url, store.database()).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
