//! Query normalization.
//!
//! Free-text queries are canonicalized into cache keys before any other
//! component looks at them. Every caller (the read API and the queue
//! consumer) must go through [`normalize`] - divergent normalization
//! would silently fragment the cache across mismatched keys.

use std::fmt;

/// Sentinel cache key for queries that can never match anything.
pub const NO_MATCHES: &str = "no-matches";

/// A canonicalized query string, used as a cache key.
///
/// Tokens are lower-cased, whitespace-collapsed, and space-joined in
/// their original order. Immutable once derived.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedQuery(String);

impl NormalizedQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns true if this query normalized to the [`NO_MATCHES`] sentinel.
    pub fn is_unmatchable(&self) -> bool {
        self.0 == NO_MATCHES
    }
}

impl fmt::Display for NormalizedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalizes a free-text query into a cache key.
///
/// A query with no tokens, any token containing a `*` wildcard, or
/// nothing but `-`-prefixed negation tokens maps to [`NO_MATCHES`].
pub fn normalize(raw: &str) -> NormalizedQuery {
    let tokens: Vec<String> = raw.split_whitespace().map(str::to_lowercase).collect();

    if tokens.is_empty()
        || tokens.iter().any(|t| t.contains('*'))
        || tokens.iter().all(|t| t.starts_with('-'))
    {
        return NormalizedQuery(NO_MATCHES.to_string());
    }

    NormalizedQuery(tokens.join(" "))
}
