use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Document, Bson, doc, oid::ObjectId};
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions},
};
use tracing::{debug, info};
use bookshelf_core::{
    backend::{StoreBackend, StoreBackendBuilder, StoredDocument},
    error::{StoreError, StoreResult},
    query::{Query, QueryVisitor, SortDirection},
};

use crate::{sanitizer::KeySanitizer, query::MongoQueryTranslator};

const ID_KEY: &str = "_id";


/// MongoDB-backed document storage.
///
/// Document identifiers are stored as string `_id`s; freshly allocated ones
/// are ObjectId hex strings. The body is stored beside `_id` with its keys
/// escaped by the key sanitizer.
#[derive(Debug, Clone)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(&KeySanitizer::sanitize_key(collection_name))
    }
}

/// Builds the stored form of a document body.
pub(crate) fn prepare_document(id: &str, document: &Document) -> Document {
    let mut prepared = doc! { ID_KEY: id };
    prepared.extend(KeySanitizer::sanitize_document(document));
    prepared
}

/// Splits a stored document back into its identifier and body.
pub(crate) fn restore_document(mut stored: Document) -> StoreResult<StoredDocument> {
    let id = match stored.remove(ID_KEY) {
        Some(Bson::String(id)) => id,
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(other) => {
            return Err(StoreError::InvalidDocument(format!(
                "unsupported _id type {:?}",
                other.element_type()
            )));
        }
        None => return Err(StoreError::InvalidDocument("document without _id".to_string())),
    };

    Ok((id, KeySanitizer::restore_document(&stored)))
}

fn backend_error(err: mongodb::error::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    fn allocate_id(&self) -> String {
        ObjectId::new().to_hex()
    }

    async fn set_document(&self, id: &str, document: Document, collection: &str) -> StoreResult<()> {
        self.get_collection(collection)
            .replace_one(doc! { ID_KEY: id }, prepare_document(id, &document))
            .upsert(true)
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn get_document(&self, id: &str, collection: &str) -> StoreResult<Option<Document>> {
        self.get_collection(collection)
            .find_one(doc! { ID_KEY: id })
            .await
            .map_err(backend_error)?
            .map(|stored| restore_document(stored).map(|(_, body)| body))
            .transpose()
    }

    async fn delete_document(&self, id: &str, collection: &str) -> StoreResult<()> {
        self.get_collection(collection)
            .delete_one(doc! { ID_KEY: id })
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<StoredDocument>> {
        query.validate()?;

        let mut options = FindOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(limit as i64);
        }
        if let Some(skip) = query.offset {
            options.skip = Some(skip as u64);
        }
        if let Some(sort) = &query.sort {
            let key = KeySanitizer::sanitize_key(&sort.field);
            let direction = match sort.direction {
                SortDirection::Asc => 1,
                SortDirection::Desc => -1,
            };

            // _id breaks ties so paging is deterministic
            options.sort = Some(doc! { key: direction, ID_KEY: 1 });
        }

        let filter = match query.effective_filter() {
            Some(expr) => MongoQueryTranslator.visit_expr(&expr)?,
            None => doc! {},
        };

        debug!(collection, ?filter, "running mongodb find");

        self.get_collection(collection)
            .find(filter)
            .with_options(options)
            .await
            .map_err(backend_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(backend_error)?
            .into_iter()
            .map(restore_document)
            .collect()
    }

    async fn shutdown(&self) -> StoreResult<()> {
        self.client.clone().shutdown().await;

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        let options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))?;
        let client = Client::with_options(options)
            .map_err(|e| StoreError::Initialization(e.to_string()))?;

        info!(database = %self.database, "mongodb client configured");

        Ok(MongoDbStore::new(client, self.database))
    }
}
