//! Search index definitions and field projections.
//!
//! Each [`DocumentClass`](crate::DocumentClass) owns exactly one index. The
//! same field list drives three things: the `FT.CREATE` schema, the aliases a
//! query may filter on, and the columns of a sampled CSV export.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Attribute type of an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    /// Full-text field.
    Text,
    /// Exact-match tag field.
    Tag,
    /// Numeric field.
    Numeric,
}

impl FieldType {
    /// Keyword used in the index schema.
    pub fn keyword(&self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Tag => "TAG",
            FieldType::Numeric => "NUMERIC",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One indexed field: a JSON path inside the document, the alias it is
/// queried by, and its attribute type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProjection {
    /// JSONPath of the field, e.g. `$.primaryIdentifiers.email`.
    pub path: String,
    /// Alias used in queries (`@alias:...`) and as the CSV column name.
    pub alias: String,
    /// Attribute type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldProjection {
    /// Create a TEXT field projection.
    pub fn text(path: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: alias.into(),
            field_type: FieldType::Text,
        }
    }

    /// Path components below the document root (`$.a.b` → `["a", "b"]`).
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path
            .trim_start_matches('$')
            .split('.')
            .filter(|s| !s.is_empty())
    }

    /// Resolve this field inside `document`.
    ///
    /// Returns `None` when any path component is missing or the leaf is not
    /// a string.
    pub fn extract<'a>(&self, document: &'a Value) -> Option<&'a str> {
        let mut current = document;
        for segment in self.segments() {
            current = current.as_object()?.get(segment)?;
        }
        current.as_str()
    }
}

/// A named index over one key prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name, e.g. `customerIdx`.
    pub name: String,
    /// Key prefix filter, e.g. `customer:`.
    pub prefix: String,
    /// Ordered field projections.
    pub fields: Vec<FieldProjection>,
}

impl IndexDefinition {
    /// Index over customer documents.
    pub fn customer() -> Self {
        Self {
            name: "customerIdx".to_string(),
            prefix: "customer:".to_string(),
            fields: vec![
                FieldProjection::text("$.primaryIdentifiers.email", "email"),
                FieldProjection::text("$.primaryIdentifiers.phone", "phone"),
                FieldProjection::text("$.primaryIdentifiers.cmec_visitor_id", "visitor_id"),
            ],
        }
    }

    /// Index over event documents.
    pub fn event() -> Self {
        Self {
            name: "eventIdx".to_string(),
            prefix: "event:".to_string(),
            fields: vec![
                FieldProjection::text("$.identifiers.cmec_visitor_id", "visitor_id"),
                FieldProjection::text("$.identifiers.cmec_contact_call_id", "call_id"),
                FieldProjection::text("$.identifiers.cmec_contact_chat_id", "chat_id"),
                FieldProjection::text("$.identifiers.cmec_contact_external_id", "external_id"),
                FieldProjection::text("$.identifiers.cmec_contact_form2lead_id", "form2lead_id"),
                FieldProjection::text("$.identifiers.cmec_contact_tickets_id", "tickets_id"),
            ],
        }
    }

    /// Field aliases in schema order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.alias.as_str())
    }

    /// Whether `alias` names one of this index's fields.
    pub fn has_alias(&self, alias: &str) -> bool {
        self.fields.iter().any(|f| f.alias == alias)
    }

    /// Arguments of the `FT.CREATE` command that builds this index.
    pub fn create_command(&self) -> Vec<String> {
        let mut args = vec![
            "FT.CREATE".to_string(),
            self.name.clone(),
            "ON".to_string(),
            "JSON".to_string(),
            "PREFIX".to_string(),
            "1".to_string(),
            self.prefix.clone(),
            "SCHEMA".to_string(),
        ];
        for field in &self.fields {
            args.push(field.path.clone());
            args.push("AS".to_string());
            args.push(field.alias.clone());
            args.push(field.field_type.keyword().to_string());
        }
        args
    }

    /// Arguments of the `FT.DROPINDEX` command for this index.
    pub fn drop_command(&self) -> Vec<String> {
        vec!["FT.DROPINDEX".to_string(), self.name.clone()]
    }

    /// Flatten `document` into one value per field, in schema order.
    /// Missing or non-string fields become empty strings.
    pub fn project(&self, document: &Value) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.extract(document).unwrap_or_default().to_string())
            .collect()
    }
}
