//! In-memory storage implementation for the document store.
//!
//! Documents live in ordered maps keyed by identifier, behind an async-aware
//! read-write lock, so identifier order is the store's implicit document
//! order.

use std::{collections::{BTreeMap, HashMap}, sync::{Arc, atomic::{AtomicBool, Ordering}}};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::Document;
use tracing::debug;

use bookshelf_core::{
    query::{Query, SortDirection},
    error::{StoreError, StoreResult},
    backend::{StoreBackend, StoreBackendBuilder, StoredDocument},
};

use crate::evaluator::{DocumentEvaluator, Comparable};

type CollectionMap = BTreeMap<String, Document>;
type StoreMap = HashMap<String, CollectionMap>;


/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable; clones share the same underlying data. It is
/// the development backend and the test double for repositories.
///
/// Queries scan every document of the collection.
///
/// # Example
///
/// ```ignore
/// use bookshelf_memory::InMemoryStore;
/// use bookshelf_core::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// store.set_document("b1", doc! { "title": "Dune" }, "Book").await?;
/// assert!(store.get_document("b1", "Book").await?.is_some());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection_name -> (document_id -> document)
    store: Arc<RwLock<StoreMap>>,
    closed: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Number of documents currently held in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.store
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Backend("in-memory store has been shut down".to_string()));
        }

        Ok(())
    }
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn set_document(&self, id: &str, document: Document, collection: &str) -> StoreResult<()> {
        self.ensure_open()?;

        self.store
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);

        Ok(())
    }

    async fn get_document(&self, id: &str, collection: &str) -> StoreResult<Option<Document>> {
        self.ensure_open()?;

        Ok(
            self.store
                .read()
                .await
                .get(collection)
                .and_then(|documents| documents.get(id))
                .cloned()
        )
    }

    async fn delete_document(&self, id: &str, collection: &str) -> StoreResult<()> {
        self.ensure_open()?;

        if let Some(documents) = self.store.write().await.get_mut(collection) {
            documents.remove(id);
        }

        Ok(())
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<StoredDocument>> {
        self.ensure_open()?;
        query.validate()?;

        let store = self.store.read().await;
        let Some(documents) = store.get(collection) else {
            return Ok(vec![]);
        };

        let filter = query.effective_filter();
        let mut matched = Vec::new();

        for (id, document) in documents {
            let keep = match &filter {
                Some(expr) => DocumentEvaluator::new(document).evaluate(expr)?,
                None => true,
            };

            if keep {
                matched.push((id, document));
            }
        }

        // Stable sort: equal keys stay in identifier order
        if let Some(sort) = &query.sort {
            matched.sort_by(|(_, a), (_, b)| {
                let left = a.get(&sort.field).map(Comparable::from).unwrap_or(Comparable::Null);
                let right = b.get(&sort.field).map(Comparable::from).unwrap_or(Comparable::Null);

                match sort.direction {
                    SortDirection::Asc => left.sort_cmp(&right),
                    SortDirection::Desc => right.sort_cmp(&left),
                }
            });
        }

        debug!(collection, matched = matched.len(), "in-memory query evaluated");

        Ok(
            matched
                .into_iter()
                .skip(query.offset.unwrap_or(0))
                .take(query.limit.unwrap_or(usize::MAX))
                .map(|(id, document)| (id.clone(), document.clone()))
                .collect()
        )
    }

    async fn shutdown(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::Release);

        Ok(())
    }
}


/// Builder for [`InMemoryStore`], optionally pre-seeded with documents.
///
/// ```ignore
/// let store = InMemoryStore::builder()
///     .with_document("Book", "b1", doc! { "title": "Dune" })
///     .build()
///     .await?;
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder {
    seed: Vec<(String, String, Document)>,
}

impl InMemoryStoreBuilder {
    pub fn with_document(mut self, collection: &str, id: &str, document: Document) -> Self {
        self.seed.push((collection.to_string(), id.to_string(), document));
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        let mut map = StoreMap::new();

        for (collection, id, document) in self.seed {
            map.entry(collection).or_default().insert(id, document);
        }

        Ok(InMemoryStore {
            store: Arc::new(RwLock::new(map)),
            closed: Arc::default(),
        })
    }
}
