//! Book data access.
//!
//! [`BookRepository`] is the single entry point for reading and writing
//! books. It owns no state beyond shared handles, so clones are cheap and can
//! be moved into request handlers freely.
//!
//! # Paging
//!
//! Listings are ordered by title and resume strictly after the title carried
//! in the page token. Books whose title is missing, empty or not a string are
//! never listed. Whether another page exists is decided by a second query
//! skipping `limit` books past the same cursor; the two queries are not
//! atomic, so concurrent writes can skip or repeat books across pages.
//!
//! ```ignore
//! let repository = BookRepository::new(store, Arc::new(NoopQueue));
//!
//! let mut token = None;
//! loop {
//!     let page = repository.list(20, token.as_deref()).await?;
//!     render(&page.items);
//!     match page.next_page_token {
//!         Some(next) => token = Some(next),
//!         None => break,
//!     }
//! }
//! ```

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use bookshelf_core::{
    collection::{Collection, DocumentRef},
    document::DocumentExt,
    error::{StoreError, StoreResult},
    page::Page,
    query::{Expr, Filter, Query, SortDirection},
    queue::BackgroundQueue,
    store::DynDocumentStore,
};

use crate::book::{Book, BookData, CREATED_BY_FIELD, TITLE_FIELD, title_token};

/// Default name of the collection books are stored in.
pub const DEFAULT_COLLECTION: &str = "Book";


#[derive(Debug, Clone)]
pub struct BookRepository {
    store: DynDocumentStore,
    queue: Arc<dyn BackgroundQueue>,
    collection: String,
}

impl BookRepository {
    pub fn new(store: DynDocumentStore, queue: Arc<dyn BackgroundQueue>) -> Self {
        Self {
            store,
            queue,
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }

    /// Stores books in `collection` instead of [`DEFAULT_COLLECTION`].
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// Lists up to `limit` books by ascending title, after `page_token`.
    ///
    /// A `None` or empty token starts from the first book. Only books whose
    /// title is a non-empty string are listed.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::InvalidQuery`] when `limit` is zero, and with
    /// the store's error when either query fails. A failing look-ahead query
    /// discards the page that was already fetched.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn list(&self, limit: usize, page_token: Option<&str>) -> StoreResult<Page<Book>> {
        self.fetch_page(None, limit, page_token).await
    }

    /// Like [`list`](Self::list), restricted to books created by `user_id`.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn list_by(
        &self,
        user_id: &str,
        limit: usize,
        page_token: Option<&str>,
    ) -> StoreResult<Page<Book>> {
        self.fetch_page(Some(Filter::eq(CREATED_BY_FIELD, user_id)), limit, page_token)
            .await
    }

    /// Stores `data` under a newly allocated id.
    ///
    /// Any `id` field in `data` is overwritten with the allocated one. When
    /// `enqueue_for_background` is set the new id is handed to the background
    /// queue; a failed hand-off is logged and does not fail the call.
    #[instrument(skip(self, data), fields(collection = %self.collection))]
    pub async fn create(&self, data: BookData, enqueue_for_background: bool) -> StoreResult<Book> {
        self.write(self.books().doc(None), data, enqueue_for_background)
            .await
    }

    /// Replaces the book at `id` with `data`, creating it if it does not exist.
    ///
    /// Fields missing from `data` are dropped from the stored book. Without an
    /// `id` this behaves exactly like [`create`](Self::create).
    #[instrument(skip(self, data), fields(collection = %self.collection))]
    pub async fn update(
        &self,
        id: Option<&str>,
        data: BookData,
        enqueue_for_background: bool,
    ) -> StoreResult<Book> {
        self.write(self.books().doc(id), data, enqueue_for_background)
            .await
    }

    /// Fetches the book stored at `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`] if there is no such book.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn read(&self, id: &str) -> StoreResult<Book> {
        match self.books().doc(Some(id)).get().await? {
            Some(fields) => Ok(Book::new(id.to_string(), fields)),
            None => Err(StoreError::DocumentNotFound(
                id.to_string(),
                self.collection.clone(),
            )),
        }
    }

    /// Deletes the book at `id`. Deleting a missing book succeeds.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.books().doc(Some(id)).delete().await
    }

    fn books(&self) -> Collection<'_> {
        self.store.collection(&self.collection)
    }

    async fn write(
        &self,
        document: DocumentRef<'_>,
        data: BookData,
        enqueue_for_background: bool,
    ) -> StoreResult<Book> {
        let fields = data.with_id(document.id());
        document.set(fields.clone()).await?;

        if enqueue_for_background {
            self.enqueue(document.id());
        }

        Ok(Book::new(document.id().to_string(), fields))
    }

    fn enqueue(&self, id: &str) {
        if let Err(error) = self.queue.queue_book(id) {
            warn!(book_id = id, %error, "failed to queue book for background processing");
        }
    }

    async fn fetch_page(
        &self,
        filter: Option<Expr>,
        limit: usize,
        page_token: Option<&str>,
    ) -> StoreResult<Page<Book>> {
        // Without a token the cursor is "", so only non-empty string titles
        // are listed and every token resumes exactly where its page ended.
        let mut builder = Query::builder()
            .order_by(TITLE_FIELD, SortDirection::Asc)
            .start_after(page_token.unwrap_or(""))
            .limit(limit);

        if let Some(filter) = filter {
            builder = builder.filter(filter);
        }

        let query = builder.build();
        let lookahead = query.with_offset(limit);
        let books = self.books();

        let items: Vec<Book> = books
            .query(query)
            .await?
            .into_iter()
            .map(|(id, fields)| Book::new(id, fields))
            .collect();

        if items.is_empty() {
            return Ok(Page::default());
        }

        let has_more = !books.query(lookahead).await?.is_empty();
        let next_page_token = if has_more {
            items.last().and_then(title_token)
        } else {
            None
        };

        debug!(count = items.len(), has_more, "fetched book page");

        Ok(Page::builder(items)
            .with_next_page_token(next_page_token)
            .build())
    }
}
