//! Book data access over a document store.
//!
//! This crate is the entry point for the bookshelf workspace. It provides the
//! [`BookRepository`](repository::BookRepository) with create, read, update,
//! delete and token-paged listing operations, and re-exports the store
//! abstraction and backends it runs on.
//!
//! # Features
//!
//! - **Schema-less books** - Payloads are BSON documents; `id`, `title` and
//!   `createdById` are the only fields the repository looks at
//! - **Multiple backends** - In-memory storage out of the box, MongoDB behind
//!   the `mongodb` feature
//! - **Background hand-off** - Writes can notify a [`BackgroundQueue`](queue::BackgroundQueue)
//!   without waiting on it
//! - **Configuration** - Backend and collection selection from files and
//!   `BOOKSHELF__*` environment variables
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use bookshelf::{prelude::*, doc};
//!
//! #[tokio::main]
//! async fn main() -> StoreResult<()> {
//!     let config = BookshelfConfig::load()?;
//!     init_tracing(&config.log_filter);
//!
//!     // Build the store once and inject it
//!     let store = config.connect().await?;
//!     let (queue, receiver) = ChannelQueue::channel();
//!     tokio::spawn(TaskForwarder::new(receiver, store.clone()).run());
//!
//!     let books = config.repository(store.clone(), Arc::new(queue));
//!
//!     let book = books
//!         .create(doc! { "title": "Alpha", "createdById": "u1" }, true)
//!         .await?;
//!
//!     let page = books.list_by("u1", 10, None).await?;
//!     assert_eq!(page.items[0].id(), book.id());
//!
//!     store.shutdown().await
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

pub mod book;
pub mod config;
pub mod forwarder;
pub mod prelude;
pub mod repository;
pub mod telemetry;

pub use bookshelf_core::{collection, document, store, backend, page, query, queue, error};

// Re-export BSON types for convenience
pub use bson;
pub use bson::doc;

/// In-memory storage backend and channel queue.
pub mod memory {
    pub use bookshelf_memory::{BookTaskReceiver, ChannelQueue, InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use bookshelf_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
