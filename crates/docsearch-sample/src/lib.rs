//! Random sampling of stored documents into CSV.
//!
//! ```text
//! scan <class>:*  ──▶ all keys ──shuffle/take/sort──▶ sampled keys
//!                                                        │
//!                                           one pipelined batch get
//!                                                        │
//!                                                        ▼
//!                     CSV: key,<alias>,...  ◀── project indexed fields
//! ```
//!
//! The sample size is `max(1, floor(total * percent / 100))`. Rows are written
//! in key order; documents that vanished or fail to parse are skipped, so the
//! number of rows written may be below the sample size.

mod error;
pub mod export;

pub use error::SampleError;
pub use export::{sample_size, select_keys, write_rows, SampleExport, SampleReport};
