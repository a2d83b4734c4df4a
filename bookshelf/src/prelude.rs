//! Convenient re-exports of commonly used types from bookshelf.
//!
//! ```ignore
//! use bookshelf::prelude::*;
//! ```
//!
//! Only [`StoreBackend`] is exported of the two backend traits; import
//! `DynStoreBackend` explicitly where it is needed.

pub use bookshelf_core::{
    collection::{Collection, DocumentRef},
    store::{DocumentStore, DynDocumentStore, IntoDynDocumentStore},
    document::DocumentExt,
    backend::{StoreBackend, StoreBackendBuilder},
    page::Page,
    query::{Query, QueryVisitor, Expr, Sort, SortDirection, FieldOp, QueryBuilder, Filter},
    queue::{BackgroundQueue, BookTask, NoopQueue},
    error::{StoreError, StoreResult, QueueError, QueueResult},
};
pub use bookshelf_memory::{ChannelQueue, InMemoryStore};

pub use crate::{
    book::{Book, BookData},
    config::{BackendConfig, BookshelfConfig},
    forwarder::TaskForwarder,
    repository::BookRepository,
    telemetry::init_tracing,
};
