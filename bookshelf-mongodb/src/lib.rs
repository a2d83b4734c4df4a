//! MongoDB backend implementation for bookshelf.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend`
//! trait. Enable it through the `mongodb` feature of the `bookshelf` crate:
//!
//! ```toml
//! [dependencies]
//! bookshelf = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Behavior
//!
//! - Writes are full-document upserts (`replaceOne` with `upsert: true`)
//! - Listing ordering uses MongoDB sorts with `_id` as the tie-breaker
//! - Start-after cursors become strict range filters on the ordering field
//! - Field names containing `.`, `$` or NUL are escaped transparently
//!
//! # Example
//!
//! ```ignore
//! use bookshelf_core::backend::StoreBackendBuilder;
//! use bookshelf_mongodb::MongoDbStore;
//!
//! let store = MongoDbStore::builder("mongodb://localhost:27017", "bookshelf")
//!     .build()
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as bookshelf_mongodb;

pub mod store;
pub mod query;
pub mod sanitizer;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
