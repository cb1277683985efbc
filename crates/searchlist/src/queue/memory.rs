//! In-memory queue implementation.
//!
//! A single shared deque standing in for the external queue. Delivery
//! here is exactly-once (a received message is gone), which is enough
//! for the tests that drive the consumer; at-least-once redelivery is
//! a property of the real transport, not of the protocol under test.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use searchlist_core::queue::{
    BatchEntry, QueueConsumer, QueueMessage, QueueProducer, Result, MAX_BATCH_SIZE,
};

/// In-memory queue backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryQueue {
    messages: Arc<Mutex<VecDeque<QueueMessage>>>,
    /// Sizes of the batches submitted through the producer side.
    batch_sizes: Arc<Mutex<Vec<usize>>>,
    receipt_counter: Arc<AtomicU64>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a raw message body, as an external producer would.
    pub async fn push(&self, body: &str) {
        let receipt = self.receipt_counter.fetch_add(1, Ordering::Relaxed);
        self.messages.lock().await.push_back(QueueMessage {
            receipt: receipt.to_string(),
            body: body.to_string(),
        });
    }

    /// Number of messages currently queued.
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    /// Bodies of all queued messages, front first.
    pub async fn bodies(&self) -> Vec<String> {
        self.messages
            .lock()
            .await
            .iter()
            .map(|m| m.body.clone())
            .collect()
    }

    /// Sizes of the batches submitted so far.
    pub async fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().await.clone()
    }
}

#[async_trait]
impl QueueConsumer for MemoryQueue {
    async fn receive(&self) -> Result<Vec<QueueMessage>> {
        let mut messages = self.messages.lock().await;
        if messages.is_empty() {
            drop(messages);
            // Stand-in for the transport's long-poll wait.
            tokio::time::sleep(Duration::from_millis(5)).await;
            return Ok(Vec::new());
        }
        let count = messages.len().min(MAX_BATCH_SIZE);
        Ok(messages.drain(..count).collect())
    }

    async fn acknowledge(&self, _message: &QueueMessage) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl QueueProducer for MemoryQueue {
    async fn send_batch(&self, entries: &[BatchEntry]) -> Result<()> {
        self.batch_sizes.lock().await.push(entries.len());
        let mut messages = self.messages.lock().await;
        for entry in entries {
            let receipt = self.receipt_counter.fetch_add(1, Ordering::Relaxed);
            messages.push_back(QueueMessage {
                receipt: receipt.to_string(),
                body: entry.body.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_receive_caps_batch_size() {
        let queue = MemoryQueue::new();
        for i in 0..15 {
            queue.push(&format!("message {i}")).await;
        }

        let batch = queue.receive().await.unwrap();
        assert_eq!(batch.len(), MAX_BATCH_SIZE);
        assert_eq!(queue.len().await, 5);
    }

    #[tokio::test]
    async fn test_send_batch_records_sizes() {
        let queue = MemoryQueue::new();
        let entries: Vec<BatchEntry> = (0..3)
            .map(|i| BatchEntry {
                id: i.to_string(),
                body: format!("body {i}"),
            })
            .collect();

        queue.send_batch(&entries).await.unwrap();

        assert_eq!(queue.batch_sizes().await, vec![3]);
        assert_eq!(queue.len().await, 3);
    }
}
