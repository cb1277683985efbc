//! Queue backend implementations.
//!
//! `SqsQueue` is the production backend; `MemoryQueue` provides the
//! same interface in process memory for tests.

pub mod memory;
pub mod sqs;

#[allow(unused_imports)]
pub use memory::MemoryQueue;
#[allow(unused_imports)]
pub use sqs::SqsQueue;
