//! Document body encoding shared by every store implementation.

use crate::error::StoreError;
use serde_json::Value;
use tracing::{error, warn};

/// Serialize `document` for storage under `key`.
///
/// A string value that itself holds a JSON object is stored as that object
/// rather than as a stringified blob. A string that is not valid JSON is
/// stored as a plain JSON string.
pub fn encode_document(key: &str, document: &Value) -> Result<String, StoreError> {
    if let Value::String(text) = document {
        match serde_json::from_str::<serde_json::Map<String, Value>>(text) {
            Ok(object) => {
                warn!(key, "Document was a string holding JSON, storing it as an object");
                return Ok(serde_json::to_string(&object)?);
            }
            Err(_) => {
                error!(key, "Document is a string but not valid JSON, storing as string");
            }
        }
    }
    Ok(serde_json::to_string(document)?)
}

/// Strip the single-element array the store wraps root-path reads in.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}

/// Parse a raw body returned by the store and strip its envelope.
pub fn decode_document(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(raw.trim()).map(unwrap_envelope)
}

/// Parse a root-path read. An empty envelope means no document was found.
///
/// A stored empty array arrives as `[[]]` and is returned as `[]`.
pub fn decode_root_read(raw: &str) -> Result<Option<Value>, serde_json::Error> {
    match serde_json::from_str::<Value>(raw.trim())? {
        Value::Array(items) if items.is_empty() => Ok(None),
        envelope => Ok(Some(unwrap_envelope(envelope))),
    }
}
