//! Filter sets and the query compiler.
//!
//! A [`FilterSet`] maps index aliases to literal values. [`compile_query`]
//! turns it into the store's query language: one quoted, escaped phrase
//! clause per alias, joined by spaces (implicit AND).

use crate::error::SearchError;
use docsearch_core::IndexDefinition;
use serde::Serialize;

/// Query that matches every document in the index.
pub const MATCH_ALL: &str = "*";

/// Characters that carry meaning in the query grammar and are prefixed with
/// a backslash inside values.
pub const RESERVED_CHARS: &[char] = &[
    '\\', '"', '-', '[', ']', '{', '}', '(', ')', '<', '>', ':', '~', '*', '?', '|', '&', '\'',
    '!', '#', '$', '%', '^', '=',
];

/// Ordered alias → value filters. Setting an alias twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    filters: Vec<(String, String)>,
}

impl FilterSet {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `alias` to `value`, replacing any earlier value for the alias.
    pub fn insert(&mut self, alias: impl Into<String>, value: impl Into<String>) {
        let alias = alias.into();
        let value = value.into();
        match self.filters.iter_mut().find(|(a, _)| *a == alias) {
            Some((_, existing)) => *existing = value,
            None => self.filters.push((alias, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, alias: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(alias, value);
        self
    }

    /// Parse `alias=value` arguments. Arguments without `=` are ignored; the
    /// value may itself contain `=`.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for arg in args {
            if let Some((alias, value)) = arg.as_ref().split_once('=') {
                set.insert(alias, value);
            }
        }
        set
    }

    /// Filters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters.iter().map(|(a, v)| (a.as_str(), v.as_str()))
    }

    /// Number of distinct aliases.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether no filters are set.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Check every alias against the fields of `index`.
    pub fn validate_for(&self, index: &IndexDefinition) -> Result<(), SearchError> {
        for (alias, _) in self.iter() {
            if !index.has_alias(alias) {
                let known: Vec<&str> = index.aliases().collect();
                return Err(SearchError::Validation(format!(
                    "unknown filter '{alias}' for index {} (expected one of: {})",
                    index.name,
                    known.join(", ")
                )));
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (alias, value) in iter {
            set.insert(alias, value);
        }
        set
    }
}

/// Prefix every reserved character in `value` with a backslash.
///
/// Input is always raw caller text, so every backslash is escaped as well.
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        if RESERVED_CHARS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Compile `filters` into a query string.
///
/// Each filter becomes `@alias:"escaped value"`; clauses are joined with a
/// single space. An empty set compiles to [`MATCH_ALL`].
pub fn compile_query(filters: &FilterSet) -> String {
    if filters.is_empty() {
        return MATCH_ALL.to_string();
    }
    filters
        .iter()
        .map(|(alias, value)| format!("@{alias}:\"{}\"", escape_value(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Whether `text` contains a reserved character not preceded by an escape.
    fn has_unescaped_reserved(text: &str) -> bool {
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                chars.next();
            } else if RESERVED_CHARS.contains(&c) {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_empty_set_matches_all() {
        assert_eq!(compile_query(&FilterSet::new()), "*");
    }

    #[test]
    fn test_single_email_filter() {
        let filters = FilterSet::new().with("email", "a@b.com");
        assert_eq!(compile_query(&filters), r#"@email:"a@b.com""#);
    }

    #[test]
    fn test_clauses_in_insertion_order() {
        let filters = FilterSet::new()
            .with("visitor_id", "abc")
            .with("call_id", "call_xyz");
        assert_eq!(
            compile_query(&filters),
            r#"@visitor_id:"abc" @call_id:"call_xyz""#
        );
    }

    #[test]
    fn test_last_write_wins() {
        let filters = FilterSet::from_args(["email=first@x.com", "phone=1", "email=second@x.com"]);
        assert_eq!(filters.len(), 2);
        assert_eq!(
            compile_query(&filters),
            r#"@email:"second@x.com" @phone:"1""#
        );
    }

    #[test]
    fn test_from_args_ignores_malformed_and_keeps_equals_in_value() {
        let filters = FilterSet::from_args(["nonsense", "tickets_id=a=b"]);
        let pairs: Vec<(&str, &str)> = filters.iter().collect();
        assert_eq!(pairs, vec![("tickets_id", "a=b")]);
    }

    #[test]
    fn test_escapes_reserved_characters() {
        assert_eq!(escape_value(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_value("+1 (555) 010-9999"), r"+1 \(555\) 010\-9999");
        assert_eq!(escape_value(r"C:\path"), r"C\:\\path");
        assert_eq!(escape_value("plain"), "plain");
    }

    #[test]
    fn test_every_reserved_character_is_escaped() {
        let all: String = RESERVED_CHARS.iter().collect();
        let escaped = escape_value(&all);
        assert_eq!(escaped.len(), all.len() * 2);
        assert!(!has_unescaped_reserved(&escaped));
    }

    #[test]
    fn test_compiled_clauses_never_leak_reserved_characters() {
        let values = [
            "a@b.com",
            r#"\""#,
            "(x|y)&!z",
            "~*?%^=$#",
            r"trailing\",
            "{[<>]}",
            "it's-a:test",
        ];
        for value in values {
            let filters = FilterSet::new().with("email", value);
            let query = compile_query(&filters);
            let inner = query
                .strip_prefix("@email:\"")
                .and_then(|q| q.strip_suffix('"'))
                .expect("clause shape");
            assert!(
                !has_unescaped_reserved(inner),
                "unescaped reserved character in {query}"
            );
        }
    }

    #[test]
    fn test_one_clause_per_alias() {
        let filters: FilterSet = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        let query = compile_query(&filters);
        assert_eq!(query.matches('@').count(), 2);
        assert_eq!(query.split(' ').count(), 2);
    }

    #[test]
    fn test_validate_for_index() {
        let index = IndexDefinition::customer();
        assert!(FilterSet::new().with("email", "x").validate_for(&index).is_ok());

        let err = FilterSet::new()
            .with("call_id", "x")
            .validate_for(&index)
            .unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
    }
}
