//! In-memory collaborators for bookshelf.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `StoreBackend` trait and a channel-backed `BackgroundQueue`. Both are meant
//! for development, tests and single-process deployments.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using an async-aware RwLock
//! - **Full query support** - Filtering, ordering, start-after cursors and offset/limit
//! - **Deterministic order** - Ties on the ordering field fall back to document id order
//! - **Channel queue** - Non-blocking book task hand-off to an in-process worker
//!
//! # Quick Start
//!
//! ```ignore
//! use bookshelf_core::store::{DocumentStore, IntoDynDocumentStore};
//! use bookshelf_memory::{ChannelQueue, InMemoryStore};
//!
//! let store = DocumentStore::new(InMemoryStore::new()).into_dyn();
//! let (queue, mut tasks) = ChannelQueue::channel();
//! ```

#[allow(unused_extern_crates)]
extern crate self as bookshelf_memory;

pub mod evaluator;
pub mod queue;
pub mod store;

pub use queue::{BookTaskReceiver, ChannelQueue};
pub use store::{InMemoryStore, InMemoryStoreBuilder};
