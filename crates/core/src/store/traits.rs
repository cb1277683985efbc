use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Key-value/sorted-set store operations consumed by the cache protocol.
///
/// Sorted sets rank members by score ascending; "trim" keeps the
/// highest-scored members and "rev range" reads from the top. A key
/// whose collection becomes empty ceases to exist, and [`exists`]
/// reflects that - the protocol leans on key existence as its only
/// concurrency guard.
///
/// [`exists`]: Store::exists
#[async_trait]
pub trait Store: Send + Sync {
    /// Adds a member to a set.
    async fn set_add(&self, key: &str, member: &str) -> Result<()>;

    /// Removes a member from a set.
    async fn set_remove(&self, key: &str, member: &str) -> Result<()>;

    /// Returns all members of a set.
    async fn set_members(&self, key: &str) -> Result<Vec<String>>;

    /// Returns the cardinality of a set.
    async fn set_size(&self, key: &str) -> Result<u64>;

    /// Atomically removes and returns one arbitrary member of a set.
    async fn set_pop(&self, key: &str) -> Result<Option<String>>;

    /// Inserts `(score, member)` pairs into a sorted set, overwriting
    /// the scores of members already present.
    async fn sorted_insert(&self, key: &str, entries: &[(f64, String)]) -> Result<()>;

    /// Returns the cardinality of a sorted set.
    async fn sorted_size(&self, key: &str) -> Result<u64>;

    /// Discards the lowest-scored members so at most `max` remain.
    async fn sorted_trim(&self, key: &str, max: usize) -> Result<()>;

    /// Stores the rank-sum union of `sources` into `dest`. An empty
    /// union removes `dest`.
    async fn sorted_union(&self, dest: &str, sources: &[String]) -> Result<()>;

    /// Returns up to `limit` members, highest score first.
    async fn sorted_rev_range(&self, key: &str, limit: usize) -> Result<Vec<String>>;

    /// Appends a value to the tail of a list.
    async fn list_push(&self, key: &str, value: &str) -> Result<()>;

    /// Removes and returns the head of a list.
    async fn list_pop(&self, key: &str) -> Result<Option<String>>;

    /// Sets the key's time to live.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Returns true if the key exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Removes a key.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Returns all keys matching a glob pattern.
    async fn scan(&self, pattern: &str) -> Result<Vec<String>>;
}
