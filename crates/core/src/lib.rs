//! Core domain types for the searchlist service.
//!
//! This crate holds the pure pieces of the system: query normalization,
//! the invalidation command wire codec, cache key construction, and the
//! traits for the store, queue, and origin-search collaborators. The
//! runtime implementations live in the `searchlist` binary crate.

pub mod command;
pub mod origin;
pub mod query;
pub mod queue;
pub mod store;
