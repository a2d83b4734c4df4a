//! Core abstractions for the bookshelf data-access layer.
//!
//! This crate provides:
//!
//! - **Store backend abstraction** ([`backend`]) - The trait every storage engine implements
//! - **Query API** ([`query`]) - Filters, ordering, start-after cursors and offset/limit paging
//! - **Collections** ([`collection`]) - Collection and single-document handles
//! - **Document store** ([`store`]) - Owned and shared store handles
//! - **Payload helpers** ([`document`]) - Identity stamping and JSON conversion for documents
//! - **Pages** ([`page`]) - Token-paged results
//! - **Background queue** ([`queue`]) - Fire-and-forget task hand-off
//! - **Errors** ([`error`]) - Store and queue error types
//!
//! # Example
//!
//! ```ignore
//! use bookshelf_core::{query::{Query, SortDirection}, store::IntoDynDocumentStore};
//!
//! let store = DocumentStore::new(backend).into_dyn();
//! let first_page = store
//!     .collection("Book")
//!     .query(Query::builder().order_by("title", SortDirection::Asc).limit(10).build())
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as bookshelf_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod page;
pub mod query;
pub mod queue;
pub mod store;
