//! Message queue abstraction.
//!
//! Invalidation commands travel over an at-least-once queue: the
//! consumer long-polls for batches and acknowledges each message after
//! processing it; producers submit batches of up to
//! [`MAX_BATCH_SIZE`] entries with content-derived dedup identifiers.

mod error;
mod traits;

pub use error::{QueueError, Result};
pub use traits::{BatchEntry, QueueConsumer, QueueMessage, QueueProducer, MAX_BATCH_SIZE};
