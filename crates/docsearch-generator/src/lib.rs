//! Document generator for redis-docsearch.
//!
//! Produces customer and event documents with a seeded RNG. Each document is
//! derived from `(seed, index)` alone, so document `N` of a run can be
//! regenerated without producing the ones before it, and two runs with the
//! same seed write identical data under identical keys.
//!
//! ```text
//! DocumentGenerator { class, seed, anchor }
//!        │
//!        │ produce(index)
//!        ▼
//! StdRng::seed_from_u64(seed ⊕ index)
//!        │
//!        ├── customer::generate_customer ──▶ { customerId, primaryIdentifiers, ... }
//!        └── event::generate_event       ──▶ { event_id, visitor_data, identifiers, ... }
//! ```
//!
//! # Example
//!
//! ```rust
//! use docsearch_core::{DocumentClass, DocumentProducer};
//! use docsearch_generator::DocumentGenerator;
//!
//! let generator = DocumentGenerator::new(DocumentClass::Customer, 42);
//! let doc = generator.produce(7);
//! assert!(doc["primaryIdentifiers"]["email"].is_string());
//! assert_eq!(doc, generator.produce(7));
//! ```

pub mod customer;
pub mod event;
pub mod generator;
mod values;

pub use customer::generate_customer;
pub use event::generate_event;
pub use generator::DocumentGenerator;
