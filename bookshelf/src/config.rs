//! Runtime configuration.
//!
//! Settings come from an optional file and from environment variables with
//! the `BOOKSHELF` prefix and `__` as separator, environment taking
//! precedence:
//!
//! ```text
//! BOOKSHELF__COLLECTION=Book
//! BOOKSHELF__BACKEND__TYPE=mongodb
//! BOOKSHELF__BACKEND__DSN=mongodb://localhost:27017
//! BOOKSHELF__BACKEND__DATABASE=bookshelf
//! ```

use std::{path::Path, sync::Arc};
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;
use tracing::info;

use bookshelf_core::{
    backend::StoreBackendBuilder,
    error::{StoreError, StoreResult},
    queue::BackgroundQueue,
    store::{DocumentStore, DynDocumentStore, IntoDynDocumentStore},
};
use bookshelf_memory::{BookTaskReceiver, InMemoryStore};

use crate::{
    forwarder::{DEFAULT_TASK_COLLECTION, TaskForwarder},
    repository::{BookRepository, DEFAULT_COLLECTION},
};

const ENV_PREFIX: &str = "BOOKSHELF";

/// Which store backs the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    #[default]
    Memory,
    /// Requires the `mongodb` feature.
    #[serde(rename = "mongodb")]
    MongoDb { dsn: String, database: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BookshelfConfig {
    pub backend: BackendConfig,
    /// Collection books are stored in.
    pub collection: String,
    /// Collection the task forwarder writes background tasks to.
    pub task_collection: String,
    /// Tracing directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for BookshelfConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            collection: DEFAULT_COLLECTION.to_string(),
            task_collection: DEFAULT_TASK_COLLECTION.to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl BookshelfConfig {
    /// Loads configuration from the environment only.
    pub fn load() -> StoreResult<Self> {
        Self::from_builder(Config::builder())
    }

    /// Loads configuration from `path`, if it exists, overlaid with the environment.
    pub fn load_from(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_builder(
            Config::builder().add_source(File::from(path.as_ref()).required(false)),
        )
    }

    /// Finishes `builder` with the environment source and deserializes it.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> StoreResult<Self> {
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .and_then(|config| config.try_deserialize::<Self>())
            .map_err(config_error)
    }

    /// Builds the configured store. Call once at startup and share the handle.
    pub async fn connect(&self) -> StoreResult<DynDocumentStore> {
        match &self.backend {
            BackendConfig::Memory => {
                info!("using in-memory book store");

                let backend = InMemoryStore::builder().build().await?;
                Ok(DocumentStore::new(backend).into_dyn())
            }
            BackendConfig::MongoDb { dsn, database } => connect_mongodb(dsn, database).await,
        }
    }

    /// A repository over `store` using the configured book collection.
    pub fn repository(&self, store: DynDocumentStore, queue: Arc<dyn BackgroundQueue>) -> BookRepository {
        BookRepository::new(store, queue).with_collection(self.collection.clone())
    }

    /// A task forwarder draining `receiver` into the configured task collection.
    pub fn forwarder(&self, receiver: BookTaskReceiver, store: DynDocumentStore) -> TaskForwarder {
        TaskForwarder::new(receiver, store).with_collection(self.task_collection.clone())
    }
}

fn config_error(err: ConfigError) -> StoreError {
    StoreError::Config(err.to_string())
}

#[cfg(feature = "mongodb")]
async fn connect_mongodb(dsn: &str, database: &str) -> StoreResult<DynDocumentStore> {
    let backend = bookshelf_mongodb::MongoDbStore::builder(dsn, database)
        .build()
        .await?;

    Ok(DocumentStore::new(backend).into_dyn())
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongodb(_dsn: &str, _database: &str) -> StoreResult<DynDocumentStore> {
    Err(StoreError::Config(
        "the mongodb backend requires the `mongodb` feature".to_string(),
    ))
}
