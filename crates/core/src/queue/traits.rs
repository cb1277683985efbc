use async_trait::async_trait;

use super::Result;

/// Maximum number of entries in one batch send.
pub const MAX_BATCH_SIZE: usize = 10;

/// A message pulled from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Opaque handle used to acknowledge (delete) the message.
    pub receipt: String,
    pub body: String,
}

/// One entry of an outbound batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    /// Deduplication identifier, derived from the body.
    pub id: String,
    pub body: String,
}

/// Consuming side of the invalidation queue.
///
/// Delivery is at-least-once: a message that is received but never
/// acknowledged will be delivered again.
#[async_trait]
pub trait QueueConsumer: Send + Sync {
    /// Long-polls for the next batch of messages. An empty batch is a
    /// normal outcome of a poll timing out.
    async fn receive(&self) -> Result<Vec<QueueMessage>>;

    /// Marks a message as processed so it is not redelivered.
    async fn acknowledge(&self, message: &QueueMessage) -> Result<()>;
}

/// Producing side of the invalidation queue.
#[async_trait]
pub trait QueueProducer: Send + Sync {
    /// Submits one batch of at most [`MAX_BATCH_SIZE`] entries.
    async fn send_batch(&self, entries: &[BatchEntry]) -> Result<()>;
}
