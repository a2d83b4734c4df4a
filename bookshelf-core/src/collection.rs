//! Collection and document handles.
//!
//! A [`Collection`] is a named view over a backend. It hands out
//! [`DocumentRef`]s for single-document work and runs [`Query`]s for listings.
//!
//! ```ignore
//! let books = store.collection("Book");
//!
//! // A reference without an id allocates one up front.
//! let book = books.doc(None);
//! book.set(doc! { "title": "Dune" }).await?;
//!
//! let page = books
//!     .query(Query::builder().order_by("title", SortDirection::Asc).limit(10).build())
//!     .await?;
//! ```

use bson::Document;
use tracing::debug;

use crate::{
    backend::{DynStoreBackend, StoredDocument},
    error::StoreResult,
    query::Query,
};

/// A named collection within a store.
#[derive(Debug, Clone, Copy)]
pub struct Collection<'a> {
    name: &'a str,
    backend: &'a dyn DynStoreBackend,
}

impl<'a> Collection<'a> {
    pub(crate) fn new(name: &'a str, backend: &'a dyn DynStoreBackend) -> Self {
        Self { name, backend }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Returns a reference to the document with `id`, or to a freshly
    /// allocated identifier when `id` is `None`.
    pub fn doc(&self, id: Option<&str>) -> DocumentRef<'a> {
        let id = match id {
            Some(id) => id.to_string(),
            None => self.backend.allocate_id(),
        };

        DocumentRef {
            id,
            collection: self.name,
            backend: self.backend,
        }
    }

    /// Runs `query` after validating it.
    pub async fn query(&self, query: Query) -> StoreResult<Vec<StoredDocument>> {
        query.validate()?;
        debug!(collection = self.name, ?query, "querying collection");

        self.backend
            .query_documents(query, self.name)
            .await
    }
}

/// A handle to a single document, which may or may not exist yet.
#[derive(Debug, Clone)]
pub struct DocumentRef<'a> {
    id: String,
    collection: &'a str,
    backend: &'a dyn DynStoreBackend,
}

impl<'a> DocumentRef<'a> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn collection(&self) -> &str {
        self.collection
    }

    /// Writes `data` as the full document body, replacing any previous body.
    pub async fn set(&self, data: Document) -> StoreResult<()> {
        debug!(collection = self.collection, id = %self.id, "setting document");

        self.backend
            .set_document(&self.id, data, self.collection)
            .await
    }

    /// Reads the document body, `None` when it does not exist.
    pub async fn get(&self) -> StoreResult<Option<Document>> {
        self.backend
            .get_document(&self.id, self.collection)
            .await
    }

    /// Deletes the document. Succeeds when it does not exist.
    pub async fn delete(&self) -> StoreResult<()> {
        debug!(collection = self.collection, id = %self.id, "deleting document");

        self.backend
            .delete_document(&self.id, self.collection)
            .await
    }
}
