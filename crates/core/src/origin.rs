//! Origin search API boundary.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur talking to the origin search API.
///
/// A non-success HTTP status is deliberately *not* an error: the cache
/// treats it as a soft failure (`Ok(None)`) and leaves the slot
/// unchanged for the next scheduled pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OriginError {
    #[error("Origin request failed: {0}")]
    Transport(String),
    #[error("Origin returned a malformed response: {0}")]
    Malformed(String),
}

/// Result type for origin operations.
pub type Result<T> = std::result::Result<T, OriginError>;

/// Client for the origin tag-search API.
#[async_trait]
pub trait SearchOrigin: Send + Sync {
    /// Fetches up to `limit` most-relevant item ids for a normalized
    /// query, optionally restricted to items newer than `newer_than`.
    ///
    /// Returns `Ok(None)` when the origin answers with a non-success
    /// status; `Err` is reserved for transport faults, which propagate
    /// to the caller's retry policy.
    async fn fetch(
        &self,
        query: &str,
        newer_than: Option<NaiveDate>,
        limit: usize,
    ) -> Result<Option<Vec<u64>>>;
}
