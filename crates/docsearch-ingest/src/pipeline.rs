//! Bounded-concurrency write pipeline.

use crate::error::IngestError;
use crate::report::IngestReport;
use docsearch_core::{DocumentClass, DocumentProducer};
use docsearch_store::DocumentStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, info, warn};

/// Completed writes between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

/// Worker pool size for `count` documents given a requested size.
///
/// Never larger than `count` and never smaller than 1.
pub fn pool_size(count: u64, requested: usize) -> usize {
    let cap = usize::try_from(count).unwrap_or(usize::MAX);
    requested.min(cap).max(1)
}

/// Default pool size: half the available parallelism, bounded by `count`.
pub fn default_concurrency(count: u64) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2);
    pool_size(count, cores / 2)
}

/// Writes generated documents of one class to a store.
pub struct BulkIngest {
    store: Arc<dyn DocumentStore>,
    class: DocumentClass,
    concurrency: Option<usize>,
    progress_interval: u64,
}

impl BulkIngest {
    /// Create a pipeline writing `class` documents to `store`.
    pub fn new(store: Arc<dyn DocumentStore>, class: DocumentClass) -> Self {
        Self {
            store,
            class,
            concurrency: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Override the worker pool size. Still bounded by the document count.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Log progress every `interval` completed writes.
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Pool size used for a run of `count` documents.
    pub fn concurrency_for(&self, count: u64) -> usize {
        match self.concurrency {
            Some(requested) => pool_size(count, requested),
            None => default_concurrency(count),
        }
    }

    /// Write `count` documents built by `producer`.
    ///
    /// Individual write failures do not stop the run; they are collected in
    /// the report, ordered by document index.
    pub async fn run(&self, count: u64, producer: Arc<dyn DocumentProducer>) -> IngestReport {
        let concurrency = self.concurrency_for(count);
        let start = Instant::now();
        info!(
            "Storing {} {} documents with {} workers",
            count, self.class, concurrency
        );

        let slots = Arc::new(Semaphore::new(concurrency));
        let completed = Arc::new(AtomicU64::new(0));
        let mut tasks: JoinSet<Result<(), IngestError>> = JoinSet::new();
        let mut in_flight: HashMap<Id, (u64, String)> = HashMap::new();
        let mut failures = Vec::new();
        let mut stored = 0u64;

        for index in 0..count {
            // Slots are never closed, so acquisition only waits.
            let Ok(permit) = slots.clone().acquire_owned().await else {
                break;
            };

            let key = self.class.key(index);
            let store = Arc::clone(&self.store);
            let producer = Arc::clone(&producer);
            let completed = Arc::clone(&completed);
            let class = self.class;
            let interval = self.progress_interval;
            let task_key = key.clone();

            let handle = tasks.spawn(async move {
                let _permit = permit;
                let document = producer.produce(index);
                let result = store.put(&key, &document).await;

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % interval == 0 {
                    info!("Stored {} {} documents...", done, class);
                }
                result.map_err(|source| IngestError::Write { index, key, source })
            });
            in_flight.insert(handle.id(), (index, task_key));

            while let Some(joined) = tasks.try_join_next_with_id() {
                record(joined, &mut in_flight, &mut stored, &mut failures);
            }
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            record(joined, &mut in_flight, &mut stored, &mut failures);
        }

        failures.sort_by_key(IngestError::index);
        let report = IngestReport {
            class: self.class,
            requested: count,
            stored,
            failures,
            concurrency,
            duration: start.elapsed(),
        };

        if report.is_success() {
            info!(
                "Stored {} {} documents in {:?} ({:.1} docs/sec)",
                report.stored,
                self.class,
                report.duration,
                report.docs_per_second()
            );
        } else {
            warn!(
                "Stored {} of {} {} documents in {:?}; {} failed",
                report.stored,
                report.requested,
                self.class,
                report.duration,
                report.failed()
            );
        }
        report
    }
}

fn record(
    joined: Result<(Id, Result<(), IngestError>), JoinError>,
    in_flight: &mut HashMap<Id, (u64, String)>,
    stored: &mut u64,
    failures: &mut Vec<IngestError>,
) {
    match joined {
        Ok((id, Ok(()))) => {
            in_flight.remove(&id);
            *stored += 1;
        }
        Ok((id, Err(e))) => {
            in_flight.remove(&id);
            warn!("{}", e);
            failures.push(e);
        }
        Err(join_error) => {
            let (index, key) = in_flight
                .remove(&join_error.id())
                .unwrap_or((u64::MAX, String::new()));
            debug!("Worker for {} ended abnormally: {}", key, join_error);
            let e = IngestError::WorkerPanicked {
                index,
                key,
                message: join_error.to_string(),
            };
            warn!("{}", e);
            failures.push(e);
        }
    }
}
