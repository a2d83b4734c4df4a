//! Background processing hand-off.
//!
//! After a book is written the repository may notify a [`BackgroundQueue`].
//! The hand-off is fire-and-forget: it must not block, and its outcome never
//! changes the result of the write that triggered it.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::error::QueueResult;

/// The action name carried by book processing tasks.
pub const PROCESS_BOOK: &str = "processBook";

/// A background task keyed by book id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookTask {
    pub action: String,
    pub book_id: String,
}

impl BookTask {
    /// A task asking the worker to process the book with `book_id`.
    pub fn process_book(book_id: impl Into<String>) -> Self {
        Self {
            action: PROCESS_BOOK.to_string(),
            book_id: book_id.into(),
        }
    }
}

/// Receives book ids for asynchronous processing.
pub trait BackgroundQueue: Send + Sync + Debug {
    /// Hands the book with `id` to the queue without waiting for processing.
    fn queue_book(&self, id: &str) -> QueueResult<()>;
}

/// A queue that accepts and discards every task.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopQueue;

impl BackgroundQueue for NoopQueue {
    fn queue_book(&self, _id: &str) -> QueueResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_book_task_uses_wire_field_names() {
        let task = BookTask::process_book("b1");

        assert_eq!(
            serde_json::to_value(&task).unwrap(),
            serde_json::json!({ "action": "processBook", "bookId": "b1" })
        );
    }

    #[test]
    fn noop_queue_accepts_everything() {
        assert_eq!(NoopQueue.queue_book("anything"), Ok(()));
    }
}
