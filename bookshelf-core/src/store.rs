//! Document store handles.
//!
//! - [`DocumentStore`] - Owns a concrete backend; useful when the type is known
//! - [`DynDocumentStore`] - Shared, cloneable handle over any backend, built once
//!   at startup and injected into repositories
//!
//! ```ignore
//! use bookshelf_core::store::{DocumentStore, IntoDynDocumentStore};
//!
//! let store = DocumentStore::new(backend).into_dyn();
//! let books = store.collection("Book");
//! ```

use std::sync::Arc;

use crate::{
    backend::{DynStoreBackend, StoreBackend},
    collection::Collection,
    error::StoreResult,
};

/// A document store bound to a specific backend implementation.
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend + 'static> DocumentStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn collection<'a>(&'a self, name: &'a str) -> Collection<'a> {
        Collection::new(name, &self.backend)
    }

    pub async fn shutdown(self) -> StoreResult<()> {
        StoreBackend::shutdown(&self.backend).await
    }
}

/// A shared document store handle with the backend type erased.
///
/// Clones share one backend (and one connection pool, where the backend has
/// one).
#[derive(Debug, Clone)]
pub struct DynDocumentStore {
    backend: Arc<dyn DynStoreBackend>,
}

impl DynDocumentStore {
    pub fn new(backend: Arc<dyn DynStoreBackend>) -> Self {
        Self { backend }
    }

    pub fn collection<'a>(&'a self, name: &'a str) -> Collection<'a> {
        Collection::new(name, &*self.backend)
    }

    /// Returns the backend as `B` if that is its concrete type.
    pub fn backend_as<B: StoreBackend + 'static>(&self) -> Option<&B> {
        self.backend.as_any().downcast_ref::<B>()
    }

    /// Shuts the shared backend down. Other clones observe the shutdown.
    pub async fn shutdown(&self) -> StoreResult<()> {
        self.backend.shutdown().await
    }
}

pub trait IntoDynDocumentStore {
    fn into_dyn(self) -> DynDocumentStore;
}

impl<B: StoreBackend + 'static> IntoDynDocumentStore for DocumentStore<B> {
    fn into_dyn(self) -> DynDocumentStore {
        DynDocumentStore::new(Arc::new(self.backend))
    }
}

impl IntoDynDocumentStore for DynDocumentStore {
    fn into_dyn(self) -> DynDocumentStore {
        self
    }
}
