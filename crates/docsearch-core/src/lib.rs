//! Core types for the redis-docsearch crates.
//!
//! This crate holds the vocabulary shared by every other crate in the
//! workspace:
//!
//! - [`DocumentClass`] - the two document categories (`customer`, `event`),
//!   their key prefixes and key formatting
//! - [`IndexDefinition`] - the search index bound to each class
//! - [`FieldProjection`] - one indexed (JSON path, alias, type) field, also
//!   used to flatten documents into export rows
//! - [`DocumentProducer`] - index-addressed document construction used by
//!   bulk ingestion
//!
//! # Architecture
//!
//! ```text
//! docsearch-core (this crate)
//!    │
//!    ├─── docsearch-store      (keys, prefixes)
//!    ├─── docsearch-search     (index definitions, aliases)
//!    ├─── docsearch-generator  (document shapes per class)
//!    ├─── docsearch-ingest     (key formatting)
//!    └─── docsearch-sample     (CSV header and row projection)
//! ```

pub mod class;
pub mod producer;
pub mod schema;

pub use class::{CoreError, DocumentClass};
pub use producer::DocumentProducer;
pub use schema::{FieldProjection, FieldType, IndexDefinition};
