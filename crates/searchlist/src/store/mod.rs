//! Store backend implementations.
//!
//! `RedisStore` is the production backend; `MemoryStore` mirrors its
//! semantics for tests and dependency-free development runs. Both
//! implement [`searchlist_core::store::Store`].

pub mod memory;
pub mod redis_impl;

#[allow(unused_imports)]
pub use memory::MemoryStore;
#[allow(unused_imports)]
pub use redis_impl::RedisStore;
