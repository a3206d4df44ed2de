//! Error types for store operations.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The connection URL could not be parsed.
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    /// The backend is unreachable or the connection broke.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A single document write failed.
    #[error("Write to '{key}' failed: {message}")]
    Write { key: String, message: String },

    /// The requested key holds no document.
    #[error("Document '{0}' not found")]
    NotFound(String),

    /// The backend rejected a command.
    #[error("{command} failed: {message}")]
    Command { command: String, message: String },

    /// The backend answered with a reply of an unexpected shape.
    #[error("Unexpected reply to {command}: {reply}")]
    UnexpectedReply { command: String, reply: String },

    /// An operation did not complete within its deadline.
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    /// A document could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether this error is the "no data" condition rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub(crate) fn command(command: &str, message: impl Into<String>) -> Self {
        StoreError::Command {
            command: command.to_string(),
            message: message.into(),
        }
    }
}
