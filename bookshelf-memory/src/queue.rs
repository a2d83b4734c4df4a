//! In-process background queue over a tokio channel.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::trace;

use bookshelf_core::{
    error::{QueueError, QueueResult},
    queue::{BackgroundQueue, BookTask},
};

/// A [`BackgroundQueue`] that pushes [`BookTask`]s onto an unbounded channel.
///
/// Sending never blocks. Once the paired [`BookTaskReceiver`] is dropped or
/// closed, hand-offs fail with [`QueueError::Closed`].
#[derive(Debug, Clone)]
pub struct ChannelQueue {
    sender: UnboundedSender<BookTask>,
}

impl ChannelQueue {
    /// Creates a queue and the receiver a worker drains it from.
    pub fn channel() -> (Self, BookTaskReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();

        (Self { sender }, BookTaskReceiver { receiver })
    }
}

impl BackgroundQueue for ChannelQueue {
    fn queue_book(&self, id: &str) -> QueueResult<()> {
        trace!(book_id = id, "queueing book task");

        self.sender
            .send(BookTask::process_book(id))
            .map_err(|_| QueueError::Closed)
    }
}

/// The consuming end of a [`ChannelQueue`].
#[derive(Debug)]
pub struct BookTaskReceiver {
    receiver: UnboundedReceiver<BookTask>,
}

impl BookTaskReceiver {
    /// Waits for the next task; `None` once every sender is gone and the
    /// channel is drained.
    pub async fn recv(&mut self) -> Option<BookTask> {
        self.receiver.recv().await
    }

    /// Takes the next task if one is already waiting.
    pub fn try_recv(&mut self) -> Option<BookTask> {
        match self.receiver.try_recv() {
            Ok(task) => Some(task),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Stops accepting new tasks; already queued tasks can still be received.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tasks_arrive_in_order() {
        let (queue, mut receiver) = ChannelQueue::channel();

        queue.queue_book("b1").unwrap();
        queue.queue_book("b2").unwrap();

        assert_eq!(receiver.recv().await, Some(BookTask::process_book("b1")));
        assert_eq!(receiver.recv().await, Some(BookTask::process_book("b2")));
        assert_eq!(receiver.try_recv(), None);
    }

    #[tokio::test]
    async fn closed_receiver_rejects_tasks() {
        let (queue, mut receiver) = ChannelQueue::channel();
        receiver.close();

        assert_eq!(queue.queue_book("b1"), Err(QueueError::Closed));
    }

    #[tokio::test]
    async fn recv_ends_when_senders_are_dropped() {
        let (queue, mut receiver) = ChannelQueue::channel();
        queue.queue_book("b1").unwrap();
        drop(queue);

        assert!(receiver.recv().await.is_some());
        assert_eq!(receiver.recv().await, None);
    }
}
