//! Redis store backend.
//!
//! The production implementation of [`searchlist_core::store::Store`],
//! built on a pooled `ConnectionManager`. Sorted sets carry item ids
//! scored by the ids themselves (a monotonically increasing rank), so
//! "highest score" doubles as "most recent".

mod error;
mod store;

pub use error::map_redis_error;
pub use store::RedisStore;
