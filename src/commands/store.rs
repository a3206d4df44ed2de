//! `store-customers` / `store-events`.

use anyhow::anyhow;
use clap::Args;
use docsearch_core::DocumentClass;
use docsearch_generator::DocumentGenerator;
use docsearch_ingest::BulkIngest;
use docsearch_store::DocumentStore;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Args, Clone, Debug)]
pub struct StoreArgs {
    /// Number of documents to generate and store
    #[arg(default_value = "1000")]
    pub count: u64,

    /// Writes in flight at once (default: half the available cores)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Random seed; the same seed reproduces the same documents
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Generate and store `args.count` documents of `class`.
///
/// Fails when any write failed, after every write has been attempted.
pub async fn run_store(
    store: Arc<dyn DocumentStore>,
    class: DocumentClass,
    args: &StoreArgs,
) -> anyhow::Result<Value> {
    let generator = match args.seed {
        Some(seed) => DocumentGenerator::new(class, seed),
        None => DocumentGenerator::unseeded(class),
    };
    tracing::info!(
        "Generating {} {} documents (seed={})",
        args.count,
        class,
        generator.seed()
    );

    let mut ingest = BulkIngest::new(store, class);
    if let Some(concurrency) = args.concurrency {
        ingest = ingest.with_concurrency(concurrency);
    }
    let report = ingest.run(args.count, Arc::new(generator)).await;

    if let Some(first) = report.first_error() {
        return Err(anyhow!("{first}").context(format!(
            "Stored {} of {} {} documents; {} failed",
            report.stored,
            report.requested,
            class,
            report.failed()
        )));
    }

    Ok(json!({
        "status": "ok",
        "class": class,
        "stored": report.stored,
        "concurrency": report.concurrency,
        "duration_ms": super::millis(report.duration),
        "docs_per_second": report.docs_per_second(),
    }))
}
