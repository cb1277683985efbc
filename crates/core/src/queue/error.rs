use thiserror::Error;

/// Errors that can occur during queue operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue receive failed: {0}")]
    Receive(String),
    #[error("Queue send failed: {0}")]
    Send(String),
    #[error("Queue acknowledge failed: {0}")]
    Acknowledge(String),
}

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;
