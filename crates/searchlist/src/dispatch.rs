//! Outbound command dispatch.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use searchlist_core::queue::{BatchEntry, QueueProducer, MAX_BATCH_SIZE};

/// Deduplication id for a message body.
fn entry_id(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

/// Sends messages to the queue in batches.
///
/// A failed batch is logged and dropped; the messages carried here are
/// invalidation hints, and a missed hint is repaired by the next
/// scheduled refresh pass.
pub async fn send(queue: &dyn QueueProducer, messages: &[String]) {
    for chunk in messages.chunks(MAX_BATCH_SIZE) {
        let entries: Vec<BatchEntry> = chunk
            .iter()
            .map(|body| BatchEntry {
                id: entry_id(body),
                body: body.clone(),
            })
            .collect();
        if let Err(error) = queue.send_batch(&entries).await {
            tracing::error!(%error, count = entries.len(), "Failed to send command batch");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::MemoryQueue;

    #[tokio::test]
    async fn test_send_chunks_into_batches_of_ten() {
        let queue = MemoryQueue::new();
        let messages: Vec<String> = (0..23).map(|i| format!("message {i}")).collect();

        send(&queue, &messages).await;

        assert_eq!(queue.batch_sizes().await, vec![10, 10, 3]);
        assert_eq!(queue.len().await, 23);
    }

    #[tokio::test]
    async fn test_send_nothing_sends_no_batches() {
        let queue = MemoryQueue::new();
        send(&queue, &[]).await;
        assert!(queue.batch_sizes().await.is_empty());
    }

    #[test]
    fn test_entry_id_is_stable_and_distinct() {
        assert_eq!(entry_id("refresh\n1"), entry_id("refresh\n1"));
        assert_ne!(entry_id("refresh\n1"), entry_id("refresh\n2"));
    }
}
