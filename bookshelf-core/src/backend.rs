//! Storage backend abstraction for the document store.
//!
//! The [`StoreBackend`] trait is the seam between the book repository and a
//! concrete database. It covers exactly what the repository consumes:
//! identifier allocation, single-document set/get/delete, and ordered,
//! cursor-paged queries over one collection.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`DynStoreBackend`]: An object-safe mirror used for dependency injection
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances
//!
//! # Examples
//!
//! ```ignore
//! use bookshelf_core::backend::StoreBackend;
//! use bson::doc;
//!
//! let backend = MyBackendImpl::new();
//! let id = backend.allocate_id();
//! backend.set_document(&id, doc! { "title": "Dune" }, "Book").await?;
//! ```

use async_trait::async_trait;
use bson::{Document, Uuid};
use std::{any::Any, fmt::Debug};

use crate::{error::StoreResult, query::Query};

/// A document as returned by a query: its identifier and its body.
pub type StoredDocument = (String, Document);

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// Implementations must support concurrent access from multiple async tasks.
/// The backend is the only place where concurrency control happens; callers
/// never lock around it.
///
/// # Query contract
///
/// [`query_documents`](StoreBackend::query_documents) must honour the cursor
/// semantics documented on [`Query`]: ordering implies existence of the
/// ordering field, ties are broken by document identifier, the cursor bound is
/// strict, then offset, then limit.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Allocates a fresh, unused document identifier without writing anything.
    fn allocate_id(&self) -> String {
        Uuid::new().to_string()
    }

    /// Writes `document` under `id`, replacing any existing document entirely.
    ///
    /// The collection is created on first write.
    async fn set_document(
        &self,
        id: &str,
        document: Document,
        collection: &str,
    ) -> StoreResult<()>;

    /// Fetches the document stored under `id`, or `None` if there is none.
    async fn get_document(&self, id: &str, collection: &str) -> StoreResult<Option<Document>>;

    /// Removes the document stored under `id`.
    ///
    /// Deleting a missing document (or from a missing collection) succeeds.
    async fn delete_document(&self, id: &str, collection: &str) -> StoreResult<()>;

    /// Runs `query` against `collection`, returning matching documents in order.
    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> StoreResult<Vec<StoredDocument>>;

    /// Cleanly shuts down the backend, releasing connections.
    ///
    /// Handles are shared, so this takes `&self`; operations issued after
    /// shutdown fail with a backend error. The default implementation is a no-op.
    async fn shutdown(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Object-safe counterpart of [`StoreBackend`].
///
/// Every `StoreBackend + 'static` implements it, so a backend chosen at runtime
/// (from configuration, or a test double) can be shared behind an `Arc` and
/// injected. Import only one of the two traits where both would be in scope,
/// since their method names coincide.
#[async_trait]
pub trait DynStoreBackend: Send + Sync + Debug {
    fn allocate_id(&self) -> String;
    async fn set_document(
        &self,
        id: &str,
        document: Document,
        collection: &str,
    ) -> StoreResult<()>;
    async fn get_document(&self, id: &str, collection: &str) -> StoreResult<Option<Document>>;
    async fn delete_document(&self, id: &str, collection: &str) -> StoreResult<()>;
    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> StoreResult<Vec<StoredDocument>>;
    async fn shutdown(&self) -> StoreResult<()>;

    fn as_any(&self) -> &dyn Any;
}

#[async_trait]
impl<B: StoreBackend + 'static> DynStoreBackend for B {
    fn allocate_id(&self) -> String {
        StoreBackend::allocate_id(self)
    }

    async fn set_document(
        &self,
        id: &str,
        document: Document,
        collection: &str,
    ) -> StoreResult<()> {
        StoreBackend::set_document(self, id, document, collection).await
    }

    async fn get_document(&self, id: &str, collection: &str) -> StoreResult<Option<Document>> {
        StoreBackend::get_document(self, id, collection).await
    }

    async fn delete_document(&self, id: &str, collection: &str) -> StoreResult<()> {
        StoreBackend::delete_document(self, id, collection).await
    }

    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> StoreResult<Vec<StoredDocument>> {
        StoreBackend::query_documents(self, query, collection).await
    }

    async fn shutdown(&self) -> StoreResult<()> {
        StoreBackend::shutdown(self).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
