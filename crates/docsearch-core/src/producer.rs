//! Index-addressed document production.

use serde_json::Value;

/// Produces the document stored at a given index.
///
/// Implementations must be pure in `index` so a run can be repeated and a
/// single document regenerated without replaying the ones before it.
pub trait DocumentProducer: Send + Sync {
    /// Build the document for `index`.
    fn produce(&self, index: u64) -> Value;
}

impl<F> DocumentProducer for F
where
    F: Fn(u64) -> Value + Send + Sync,
{
    fn produce(&self, index: u64) -> Value {
        self(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_closure_producer() {
        let producer = |i: u64| json!({ "n": i });
        assert_eq!(producer.produce(3), json!({ "n": 3 }));
    }
}
