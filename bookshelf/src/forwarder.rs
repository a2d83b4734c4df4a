//! Persists queued book tasks for out-of-process workers.

use bson::{DateTime, Document, ser::serialize_to_document};
use chrono::Utc;
use tracing::{debug, info, warn};

use bookshelf_core::{
    document::DocumentExt,
    error::StoreResult,
    queue::BookTask,
    store::DynDocumentStore,
};
use bookshelf_memory::BookTaskReceiver;

/// Default collection tasks are written to.
pub const DEFAULT_TASK_COLLECTION: &str = "book_tasks";

/// Field stamped with the time a task was persisted.
pub const QUEUED_AT_FIELD: &str = "queuedAt";

/// Drains a [`BookTaskReceiver`] into a task collection of any store.
///
/// ```ignore
/// let (queue, receiver) = ChannelQueue::channel();
/// let forwarder = TaskForwarder::new(receiver, store.clone());
/// tokio::spawn(forwarder.run());
///
/// let repository = BookRepository::new(store, Arc::new(queue));
/// ```
#[derive(Debug)]
pub struct TaskForwarder {
    receiver: BookTaskReceiver,
    store: DynDocumentStore,
    collection: String,
}

impl TaskForwarder {
    pub fn new(receiver: BookTaskReceiver, store: DynDocumentStore) -> Self {
        Self {
            receiver,
            store,
            collection: DEFAULT_TASK_COLLECTION.to_string(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Forwards tasks until every queue handle is dropped and the channel is
    /// drained. Returns how many tasks were written; failed writes are logged
    /// and skipped.
    pub async fn run(mut self) -> usize {
        info!(collection = %self.collection, "task forwarder started");

        let mut forwarded = 0;
        while let Some(task) = self.receiver.recv().await {
            match self.forward(&task).await {
                Ok(id) => {
                    debug!(task_id = %id, book_id = %task.book_id, "forwarded book task");
                    forwarded += 1;
                }
                Err(error) => {
                    warn!(book_id = %task.book_id, %error, "failed to persist book task");
                }
            }
        }

        info!(forwarded, "task forwarder stopped");
        forwarded
    }

    async fn forward(&self, task: &BookTask) -> StoreResult<String> {
        let document = self.store.collection(&self.collection).doc(None);

        let mut payload = task_document(task)?;
        payload.insert(QUEUED_AT_FIELD, DateTime::from_chrono(Utc::now()));

        document.set(payload.with_id(document.id())).await?;
        Ok(document.id().to_string())
    }
}

fn task_document(task: &BookTask) -> StoreResult<Document> {
    Ok(serialize_to_document(task)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_core::queue::BackgroundQueue;
    use bookshelf_memory::ChannelQueue;

    #[test]
    fn task_documents_use_wire_field_names() {
        let document = task_document(&BookTask::process_book("b1")).unwrap();

        assert_eq!(document.get_str("action").ok(), Some("processBook"));
        assert_eq!(document.get_str("bookId").ok(), Some("b1"));
    }

    #[tokio::test]
    async fn stops_once_queue_is_dropped() {
        let store = crate::config::BookshelfConfig::default().connect().await.unwrap();
        let (queue, receiver) = ChannelQueue::channel();

        queue.queue_book("b1").unwrap();
        drop(queue);

        assert_eq!(TaskForwarder::new(receiver, store).run().await, 1);
    }
}
