//! Backend-neutral representation of command replies.
//!
//! Search replies arrive in different shapes depending on the protocol
//! version negotiated with the server, so decoding works against this enum
//! with explicit shape checks instead of the driver's value type.

use std::fmt;

/// A reply to a raw command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Absent value.
    Nil,
    /// Integer reply.
    Int(i64),
    /// UTF-8 bulk or verbatim string.
    Text(String),
    /// Bulk string that is not valid UTF-8.
    Bytes(Vec<u8>),
    /// Floating point reply.
    Double(f64),
    /// Boolean reply.
    Bool(bool),
    /// Status line such as `OK`.
    Status(String),
    /// Array, set or push reply.
    Array(Vec<Reply>),
    /// Map reply, in server order.
    Map(Vec<(Reply, Reply)>),
}

impl Reply {
    /// Text content of a string-like reply.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(s) | Reply::Status(s) => Some(s),
            Reply::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Integer content, also accepting numeric strings.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Reply::Int(n) => Some(*n),
            other => other.as_text()?.parse().ok(),
        }
    }

    /// Elements of an array reply.
    pub fn as_array(&self) -> Option<&[Reply]> {
        match self {
            Reply::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of a map reply.
    pub fn as_map(&self) -> Option<&[(Reply, Reply)]> {
        match self {
            Reply::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up `key` in a map reply by its text form.
    pub fn map_get(&self, key: &str) -> Option<&Reply> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_text() == Some(key))
            .map(|(_, v)| v)
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Nil => "nil",
            Reply::Int(_) => "integer",
            Reply::Text(_) => "string",
            Reply::Bytes(_) => "bytes",
            Reply::Double(_) => "double",
            Reply::Bool(_) => "boolean",
            Reply::Status(_) => "status",
            Reply::Array(_) => "array",
            Reply::Map(_) => "map",
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Nil => f.write_str("(nil)"),
            Reply::Int(n) => write!(f, "{n}"),
            Reply::Text(s) | Reply::Status(s) => write!(f, "{s:?}"),
            Reply::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Reply::Double(d) => write!(f, "{d}"),
            Reply::Bool(b) => write!(f, "{b}"),
            Reply::Array(items) => write!(f, "array({})", items.len()),
            Reply::Map(entries) => write!(f, "map({})", entries.len()),
        }
    }
}

impl From<redis::Value> for Reply {
    fn from(value: redis::Value) -> Self {
        use redis::Value;
        match value {
            Value::Nil => Reply::Nil,
            Value::Int(n) => Reply::Int(n),
            Value::BulkString(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Reply::Text(text),
                Err(e) => Reply::Bytes(e.into_bytes()),
            },
            Value::SimpleString(s) => Reply::Status(s),
            Value::Okay => Reply::Status("OK".to_string()),
            Value::Array(items) | Value::Set(items) => {
                Reply::Array(items.into_iter().map(Reply::from).collect())
            }
            Value::Push { data, .. } => Reply::Array(data.into_iter().map(Reply::from).collect()),
            Value::Map(entries) => Reply::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (Reply::from(k), Reply::from(v)))
                    .collect(),
            ),
            Value::Attribute { data, .. } => Reply::from(*data),
            Value::Double(d) => Reply::Double(d),
            Value::Boolean(b) => Reply::Bool(b),
            Value::VerbatimString { text, .. } => Reply::Text(text),
            other => Reply::Text(format!("{other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_redis_bulk_string() {
        let reply = Reply::from(redis::Value::BulkString(b"hello".to_vec()));
        assert_eq!(reply, Reply::Text("hello".to_string()));
    }

    #[test]
    fn test_from_redis_binary() {
        let reply = Reply::from(redis::Value::BulkString(vec![0xff, 0xfe]));
        assert_eq!(reply, Reply::Bytes(vec![0xff, 0xfe]));
    }

    #[test]
    fn test_from_redis_map() {
        let reply = Reply::from(redis::Value::Map(vec![(
            redis::Value::SimpleString("total_results".to_string()),
            redis::Value::Int(3),
        )]));
        assert_eq!(reply.map_get("total_results"), Some(&Reply::Int(3)));
        assert_eq!(reply.map_get("results"), None);
    }

    #[test]
    fn test_as_int_accepts_numeric_text() {
        assert_eq!(Reply::Text("17".to_string()).as_int(), Some(17));
        assert_eq!(Reply::Text("x".to_string()).as_int(), None);
    }
}
