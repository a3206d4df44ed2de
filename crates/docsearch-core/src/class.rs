//! Document classes and key formatting.

use crate::schema::IndexDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while interpreting core values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The document class name is not one of `customer` or `event`.
    #[error("unknown document class '{0}': expected 'customer' or 'event'")]
    UnknownClass(String),
}

/// Category of a stored document. Determines the key prefix, the search
/// index and the export columns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentClass {
    /// Customer profile documents stored under `customer:<id>`.
    Customer,
    /// Visitor event documents stored under `event:<id>`.
    Event,
}

impl DocumentClass {
    /// All classes, in a stable order.
    pub const ALL: [DocumentClass; 2] = [DocumentClass::Customer, DocumentClass::Event];

    /// Lowercase class name as used in keys and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            DocumentClass::Customer => "customer",
            DocumentClass::Event => "event",
        }
    }

    /// Key prefix including the trailing colon, e.g. `customer:`.
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentClass::Customer => "customer:",
            DocumentClass::Event => "event:",
        }
    }

    /// Key of the document with numeric id `id`.
    pub fn key(&self, id: u64) -> String {
        format!("{}{id}", self.prefix())
    }

    /// Whether `key` belongs to this class.
    pub fn owns_key(&self, key: &str) -> bool {
        key.starts_with(self.prefix())
    }

    /// Name of the search index covering this class.
    pub fn index_name(&self) -> &'static str {
        match self {
            DocumentClass::Customer => "customerIdx",
            DocumentClass::Event => "eventIdx",
        }
    }

    /// The index definition for this class.
    pub fn index(&self) -> IndexDefinition {
        match self {
            DocumentClass::Customer => IndexDefinition::customer(),
            DocumentClass::Event => IndexDefinition::event(),
        }
    }

    /// CSV header for sampled exports: `key` followed by the field aliases.
    pub fn export_header(&self) -> Vec<String> {
        std::iter::once("key".to_string())
            .chain(self.index().aliases().map(str::to_string))
            .collect()
    }
}

impl fmt::Display for DocumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DocumentClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(DocumentClass::Customer),
            "event" => Ok(DocumentClass::Event),
            other => Err(CoreError::UnknownClass(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        assert_eq!(DocumentClass::Customer.key(0), "customer:0");
        assert_eq!(DocumentClass::Event.key(42), "event:42");
    }

    #[test]
    fn test_owns_key() {
        assert!(DocumentClass::Event.owns_key("event:7"));
        assert!(!DocumentClass::Event.owns_key("customer:7"));
        assert!(!DocumentClass::Customer.owns_key("customers:7"));
    }

    #[test]
    fn test_parse_class() {
        assert_eq!(
            "customer".parse::<DocumentClass>().unwrap(),
            DocumentClass::Customer
        );
        assert_eq!(
            "order".parse::<DocumentClass>(),
            Err(CoreError::UnknownClass("order".to_string()))
        );
    }

    #[test]
    fn test_export_header() {
        assert_eq!(
            DocumentClass::Customer.export_header(),
            vec!["key", "email", "phone", "visitor_id"]
        );
        assert_eq!(
            DocumentClass::Event.export_header(),
            vec![
                "key",
                "visitor_id",
                "call_id",
                "chat_id",
                "external_id",
                "form2lead_id",
                "tickets_id"
            ]
        );
    }
}
