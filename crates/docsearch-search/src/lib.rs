//! Search over indexed documents.
//!
//! ```text
//! FilterSet ──compile_query──▶ "@email:\"a@b.com\""
//!                                   │
//!                                   ▼
//!             SearchExecutor ── FT.SEARCH ──▶ DocumentStore
//!                   │
//!                   ▼
//!             SearchResults { documents, elapsed }
//! ```
//!
//! - [`query`] - filter sets and the escaping query compiler
//! - [`index`] - drop-and-create of per-class indexes
//! - [`executor`] - paginated search and reply decoding

mod error;
pub mod executor;
pub mod index;
pub mod query;

pub use error::SearchError;
pub use executor::{decode_search_reply, Pagination, SearchExecutor, SearchResults};
pub use index::{create_index, create_indexes, IndexOutcome};
pub use query::{compile_query, escape_value, FilterSet, MATCH_ALL, RESERVED_CHARS};
