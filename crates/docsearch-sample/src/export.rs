//! Sampling pipeline and CSV writer.

use crate::error::SampleError;
use csv::Writer;
use docsearch_core::DocumentClass;
use docsearch_store::{collect_keys, decode_document, DocumentStore};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default buffer size for CSV writing.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Number of keys to sample from `total` at `percent`.
///
/// Rounds down but never below 1 while there is at least one key.
pub fn sample_size(total: usize, percent: u8) -> usize {
    if total == 0 {
        return 0;
    }
    (total * usize::from(percent.min(100)) / 100).max(1)
}

/// Shuffle `keys`, keep the first `size`, and return them sorted.
pub fn select_keys<R: Rng>(mut keys: Vec<String>, size: usize, rng: &mut R) -> Vec<String> {
    keys.shuffle(rng);
    keys.truncate(size);
    keys.sort_unstable();
    keys
}

/// Write a header row followed by `rows`, returning the number of data rows.
pub fn write_rows<W: Write>(
    writer: W,
    header: &[String],
    rows: &[Vec<String>],
) -> Result<u64, SampleError> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(header)?;
    let mut written = 0u64;
    for row in rows {
        writer.write_record(row)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Result of a sampling run.
#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    /// Document class sampled.
    pub class: DocumentClass,
    /// Number of keys selected.
    pub sampled: usize,
    /// Number of keys found under the class prefix.
    pub total: usize,
    /// Number of CSV data rows written.
    pub rows_written: u64,
    /// Wall-clock time of the run.
    #[serde(skip)]
    pub duration: Duration,
}

/// Samples a percentage of one class's documents into CSV.
#[derive(Debug, Clone)]
pub struct SampleExport {
    class: DocumentClass,
    percent: u8,
    seed: Option<u64>,
}

impl SampleExport {
    /// Create an export of `percent` percent of `class` documents.
    pub fn new(class: DocumentClass, percent: i64) -> Result<Self, SampleError> {
        if !(1..=100).contains(&percent) {
            return Err(SampleError::InvalidPercent(percent));
        }
        Ok(Self {
            class,
            percent: percent as u8,
            seed: None,
        })
    }

    /// Make the key selection reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sample into a new file at `path`.
    ///
    /// The file is created only once keys have been found and fetched. A
    /// failure while writing leaves the partial file in place.
    pub async fn run_to_path<S>(
        &self,
        store: &S,
        path: impl AsRef<Path>,
    ) -> Result<SampleReport, SampleError>
    where
        S: DocumentStore + ?Sized,
    {
        let start = Instant::now();
        let (sampled, total, rows) = self.collect(store).await?;

        let path = path.as_ref();
        let file = File::create(path)?;
        let rows_written = write_rows(
            BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file),
            &self.class.export_header(),
            &rows,
        )?;

        let report = SampleReport {
            class: self.class,
            sampled,
            total,
            rows_written,
            duration: start.elapsed(),
        };
        info!(
            "Sampled {} records out of {}. Output written to {}",
            report.sampled,
            report.total,
            path.display()
        );
        Ok(report)
    }

    /// Sample into an arbitrary writer.
    pub async fn run_to_writer<S, W>(
        &self,
        store: &S,
        writer: W,
    ) -> Result<SampleReport, SampleError>
    where
        S: DocumentStore + ?Sized,
        W: Write,
    {
        let start = Instant::now();
        let (sampled, total, rows) = self.collect(store).await?;
        let rows_written = write_rows(writer, &self.class.export_header(), &rows)?;
        Ok(SampleReport {
            class: self.class,
            sampled,
            total,
            rows_written,
            duration: start.elapsed(),
        })
    }

    /// Scan, select and fetch. Returns (sampled, total, rows).
    async fn collect<S>(
        &self,
        store: &S,
    ) -> Result<(usize, usize, Vec<Vec<String>>), SampleError>
    where
        S: DocumentStore + ?Sized,
    {
        let prefix = self.class.prefix();
        let keys = collect_keys(store, prefix).await?;
        if keys.is_empty() {
            return Err(SampleError::NoKeys(prefix.to_string()));
        }
        let total = keys.len();
        debug!("Found {} keys under {}*", total, prefix);

        let size = sample_size(total, self.percent);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let selected = select_keys(keys, size, &mut rng);
        debug!("Selected {} of {} keys", selected.len(), total);

        let fetched = store.batch_get(&selected).await?;
        let index = self.class.index();
        let mut rows = Vec::with_capacity(fetched.len());
        for (key, body) in fetched {
            let Some(body) = body.filter(|b| !b.is_empty()) else {
                debug!("Skipping {}: no document", key);
                continue;
            };
            let document = match decode_document(&body) {
                Ok(document) if document.is_object() => document,
                Ok(_) => {
                    warn!("Skipping {}: document is not an object", key);
                    continue;
                }
                Err(e) => {
                    warn!("Skipping {}: {}", key, e);
                    continue;
                }
            };
            let mut row = Vec::with_capacity(index.fields.len() + 1);
            row.push(key);
            row.extend(index.project(&document));
            rows.push(row);
        }

        Ok((size, total, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsearch_store::MemoryStore;
    use serde_json::json;

    async fn customers(count: u64) -> MemoryStore {
        let store = MemoryStore::new();
        for i in 0..count {
            let doc = json!({
                "primaryIdentifiers": {
                    "email": format!("user{i}@example.com"),
                    "phone": format!("555-{i:04}"),
                    "cmec_visitor_id": format!("v{i}"),
                }
            });
            store
                .put(&DocumentClass::Customer.key(i), &doc)
                .await
                .unwrap();
        }
        store
    }

    fn read_rows(bytes: &[u8]) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes)
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_sample_size() {
        assert_eq!(sample_size(1000, 5), 50);
        assert_eq!(sample_size(10, 5), 1);
        assert_eq!(sample_size(1, 1), 1);
        assert_eq!(sample_size(7, 100), 7);
        assert_eq!(sample_size(0, 50), 0);
        assert_eq!(sample_size(199, 50), 99);
    }

    #[test]
    fn test_select_keys_sorted_subset() {
        let keys: Vec<String> = (0..100).map(|i| format!("k{i:03}")).collect();
        let mut rng = StdRng::seed_from_u64(5);
        let selected = select_keys(keys.clone(), 10, &mut rng);
        assert_eq!(selected.len(), 10);
        assert!(selected.windows(2).all(|w| w[0] < w[1]));
        assert!(selected.iter().all(|k| keys.contains(k)));
    }

    #[test]
    fn test_invalid_percent() {
        assert!(matches!(
            SampleExport::new(DocumentClass::Event, 0),
            Err(SampleError::InvalidPercent(0))
        ));
        assert!(matches!(
            SampleExport::new(DocumentClass::Event, 101),
            Err(SampleError::InvalidPercent(101))
        ));
    }

    #[tokio::test]
    async fn test_thousand_customers_five_percent() {
        let store = customers(1000).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv");

        let report = SampleExport::new(DocumentClass::Customer, 5)
            .unwrap()
            .run_to_path(&store, &path)
            .await
            .unwrap();

        assert_eq!(report.sampled, 50);
        assert_eq!(report.total, 1000);
        assert_eq!(report.rows_written, 50);
        assert_eq!(store.batch_get_calls(), 1);

        let rows = read_rows(&std::fs::read(&path).unwrap());
        assert_eq!(rows[0], vec!["key", "email", "phone", "visitor_id"]);
        assert_eq!(rows.len(), 51);
        assert!(rows[1..].windows(2).all(|w| w[0][0] < w[1][0]));

        let first = &rows[1];
        let id = first[0].trim_start_matches("customer:");
        assert_eq!(first[1], format!("user{id}@example.com"));
        assert_eq!(first[3], format!("v{id}"));
    }

    #[tokio::test]
    async fn test_seeded_selection_reproducible() {
        let store = customers(200).await;
        let export = SampleExport::new(DocumentClass::Customer, 10)
            .unwrap()
            .with_seed(99);

        let mut a = Vec::new();
        let mut b = Vec::new();
        export.run_to_writer(&store, &mut a).await.unwrap();
        export.run_to_writer(&store, &mut b).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_no_keys() {
        let store = customers(3).await;
        let err = SampleExport::new(DocumentClass::Event, 50)
            .unwrap()
            .run_to_writer(&store, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SampleError::NoKeys(ref p) if p == "event:"));
    }

    #[tokio::test]
    async fn test_skips_unparseable_and_missing_fields() {
        let store = MemoryStore::new();
        store.insert_raw("event:1", "{not json");
        store.insert_raw("event:2", r#"{"identifiers":{"cmec_visitor_id":"abc"}}"#);
        store.insert_raw("event:3", r#""just a string""#);

        let mut out = Vec::new();
        let report = SampleExport::new(DocumentClass::Event, 100)
            .unwrap()
            .run_to_writer(&store, &mut out)
            .await
            .unwrap();

        assert_eq!(report.sampled, 3);
        assert_eq!(report.rows_written, 1);
        let rows = read_rows(&out);
        assert_eq!(rows[1], vec!["event:2", "abc", "", "", "", "", ""]);
    }

    #[tokio::test]
    async fn test_scan_failure_creates_no_file() {
        let store = MemoryStore::new().with_failing_scans();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let err = SampleExport::new(DocumentClass::Customer, 5)
            .unwrap()
            .run_to_path(&store, &path)
            .await
            .unwrap_err();
        assert!(matches!(err, SampleError::Store(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_rows_header_only() {
        let mut out = Vec::new();
        let header = DocumentClass::Customer.export_header();
        assert_eq!(write_rows(&mut out, &header, &[]).unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap(), "key,email,phone,visitor_id\n");
    }
}
