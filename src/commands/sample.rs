//! `sample-to-csv`.

use anyhow::Context;
use clap::Args;
use docsearch_core::DocumentClass;
use docsearch_sample::SampleExport;
use docsearch_store::DocumentStore;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Args, Clone, Debug)]
pub struct SampleArgs {
    /// Document class to sample
    #[arg(long = "type", value_enum)]
    pub class: DocumentClass,

    /// Percent of stored documents to sample (1-100)
    #[arg(long, default_value = "5", allow_negative_numbers = true)]
    pub percent: i64,

    /// Output CSV file
    #[arg(long)]
    pub output: PathBuf,

    /// Random seed for a reproducible sample
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Sample a percentage of one class into a CSV file.
pub async fn run_sample(store: &dyn DocumentStore, args: &SampleArgs) -> anyhow::Result<Value> {
    let mut export = SampleExport::new(args.class, args.percent)?;
    if let Some(seed) = args.seed {
        export = export.with_seed(seed);
    }

    let report = export
        .run_to_path(store, &args.output)
        .await
        .with_context(|| format!("Failed to sample {} documents", args.class))?;

    Ok(json!({
        "class": report.class,
        "sampled": report.sampled,
        "total": report.total,
        "rows_written": report.rows_written,
        "output": args.output.display().to_string(),
        "duration_ms": super::millis(report.duration),
    }))
}
