//! Index management: drop-if-exists then create.

use crate::error::SearchError;
use docsearch_core::{DocumentClass, IndexDefinition};
use docsearch_store::DocumentStore;
use tracing::{debug, info, warn};

/// Result of (re)building one class's index.
#[derive(Debug)]
pub struct IndexOutcome {
    /// Class the index covers.
    pub class: DocumentClass,
    /// Definition that was applied.
    pub definition: IndexDefinition,
    /// `Ok` when the index was created.
    pub result: Result<(), SearchError>,
}

impl IndexOutcome {
    /// Whether the index was created.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Replace the index described by `definition`.
///
/// Any existing index of the same name is dropped first; a failed drop
/// (typically "unknown index") is ignored.
pub async fn create_index<S>(store: &S, definition: &IndexDefinition) -> Result<(), SearchError>
where
    S: DocumentStore + ?Sized,
{
    if let Err(e) = store.raw_command(&definition.drop_command()).await {
        debug!("Dropping index {} skipped: {}", definition.name, e);
    }

    store
        .raw_command(&definition.create_command())
        .await
        .map_err(|source| SearchError::Index {
            index: definition.name.clone(),
            source,
        })?;

    info!(
        "Created {} on {} ({} fields)",
        definition.name,
        definition.prefix,
        definition.fields.len()
    );
    Ok(())
}

/// Rebuild the index of every document class.
///
/// Each class is attempted independently; a failure for one does not stop
/// the other.
pub async fn create_indexes<S>(store: &S) -> Vec<IndexOutcome>
where
    S: DocumentStore + ?Sized,
{
    let mut outcomes = Vec::with_capacity(DocumentClass::ALL.len());
    for class in DocumentClass::ALL {
        let definition = class.index();
        let result = create_index(store, &definition).await;
        if let Err(e) = &result {
            warn!("Failed to create index for {}: {}", class, e);
        }
        outcomes.push(IndexOutcome {
            class,
            definition,
            result,
        });
    }
    outcomes
}
