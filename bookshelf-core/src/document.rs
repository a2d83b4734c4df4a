//! Helpers for schema-less document payloads.
//!
//! Payloads are plain [`bson::Document`] values: an open mapping from field
//! name to a tagged value. Nothing here validates a schema.

use bson::{Bson, Document, ser::serialize_to_bson};
use serde_json::{Value, to_value};

use crate::error::{StoreError, StoreResult};

/// The payload field that mirrors a document's identifier.
pub const ID_FIELD: &str = "id";

/// Conversion and identity helpers for payload documents.
pub trait DocumentExt: Sized {
    /// Stamps `id` into the payload's [`ID_FIELD`], replacing any existing value.
    fn with_id(self, id: &str) -> Self;

    /// Converts the payload to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_json(&self) -> StoreResult<Value>;

    /// Builds a payload from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDocument`] if `value` is not a JSON object.
    fn from_json(value: Value) -> StoreResult<Self>;
}

impl DocumentExt for Document {
    fn with_id(mut self, id: &str) -> Self {
        self.insert(ID_FIELD, id);
        self
    }

    fn to_json(&self) -> StoreResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> StoreResult<Self> {
        match serialize_to_bson(&value)? {
            Bson::Document(document) => Ok(document),
            other => Err(StoreError::InvalidDocument(format!(
                "expected a JSON object, got {:?}",
                other.element_type()
            ))),
        }
    }
}
