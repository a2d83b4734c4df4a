//! Error types and result types for book store operations.
//!
//! Use [`StoreResult<T>`] as the return type for fallible store operations and
//! [`QueueResult<T>`] for background queue hand-offs.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
///
/// Backend failures are carried as their display message and reach the caller
/// unchanged; nothing in this workspace retries or recovers from them.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The requested document was not found in the collection.
    /// The first argument is the document ID, the second is the collection name.
    #[error("No such document! ({0} in collection {1})")]
    DocumentNotFound(String, String),
    /// The query cannot be executed as built (zero limit, cursor without ordering, ...).
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// A stored or supplied value does not have document structure.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
    /// Configuration could not be loaded or names an unavailable backend.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns `true` for the not-found condition raised by single-document reads.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::DocumentNotFound(..))
    }
}

/// A specialized `Result` type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Errors raised when handing a task to a background queue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The consuming side of the queue has gone away.
    #[error("Background queue is closed")]
    Closed,
    /// The queue refused the task.
    #[error("Background queue rejected task: {0}")]
    Rejected(String),
}

/// A specialized `Result` type for background queue hand-offs.
pub type QueueResult<T> = Result<T, QueueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_document() {
        let err = StoreError::DocumentNotFound("abc".into(), "Book".into());

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No such document! (abc in collection Book)");
    }

    #[test]
    fn json_errors_become_serialization_errors() {
        let err: StoreError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();

        assert!(matches!(err, StoreError::Serialization(_)));
        assert!(!err.is_not_found());
    }
}
