//! SQS queue backend.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sqs::types::SendMessageBatchRequestEntry;
use aws_sdk_sqs::Client;

use searchlist_core::queue::{
    BatchEntry, QueueConsumer, QueueError, QueueMessage, QueueProducer, Result,
};

/// Queue backend over an SQS queue URL.
#[derive(Debug, Clone)]
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    /// Builds a client from the ambient AWS environment.
    pub async fn from_env(queue_url: &str) -> Self {
        let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&aws_config),
            queue_url: queue_url.to_string(),
        }
    }
}

#[async_trait]
impl QueueConsumer for SqsQueue {
    async fn receive(&self) -> Result<Vec<QueueMessage>> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(10)
            .wait_time_seconds(20)
            .send()
            .await
            .map_err(|e| QueueError::Receive(e.to_string()))?;

        let messages = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| {
                let receipt = m.receipt_handle?;
                let body = m.body?;
                Some(QueueMessage { receipt, body })
            })
            .collect();
        Ok(messages)
    }

    async fn acknowledge(&self, message: &QueueMessage) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(&message.receipt)
            .send()
            .await
            .map_err(|e| QueueError::Acknowledge(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl QueueProducer for SqsQueue {
    async fn send_batch(&self, entries: &[BatchEntry]) -> Result<()> {
        let mut request = self.client.send_message_batch().queue_url(&self.queue_url);
        for entry in entries {
            let entry = SendMessageBatchRequestEntry::builder()
                .id(&entry.id)
                .message_body(&entry.body)
                .build()
                .map_err(|e| QueueError::Send(e.to_string()))?;
            request = request.entries(entry);
        }

        let output = request
            .send()
            .await
            .map_err(|e| QueueError::Send(e.to_string()))?;

        if !output.failed.is_empty() {
            let ids: Vec<&str> = output.failed.iter().map(|f| f.id.as_str()).collect();
            return Err(QueueError::Send(format!(
                "batch entries rejected: {}",
                ids.join(", ")
            )));
        }
        Ok(())
    }
}
