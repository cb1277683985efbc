//! Store key construction.
//!
//! Every key the system touches is built here so the three processes
//! can never disagree on layout.

/// Set of normalized queries awaiting first-time population.
pub const SEED_BACKLOG_KEY: &str = "searches/initial";

/// List of pending cleanup requests (`{user_id}:{query}` entries).
pub const CLEANUP_BACKLOG_KEY: &str = "searches/clean";

/// Scan pattern matching every query cache key.
pub const SEARCH_KEY_PATTERN: &str = "searches:*";

/// Sorted set of item ids cached for one normalized query.
pub fn search_key(query: &str) -> String {
    format!("searches:{query}")
}

/// Recovers the normalized query from a query cache key.
pub fn query_from_search_key(key: &str) -> Option<&str> {
    key.strip_prefix("searches:")
}

/// Set of normalized queries a user is interested in.
pub fn user_key(user_id: &str) -> String {
    format!("users:{user_id}")
}

/// Set of normalized queries under one of the user's named categories.
pub fn user_category_key(user_id: &str, category: &str) -> String {
    format!("users:{user_id}:{category}")
}

/// Scan pattern matching all of a user's category sets.
pub fn user_category_pattern(user_id: &str) -> String {
    format!("users:{user_id}:*")
}

/// Memoized rank-sum union of all the user's query caches.
pub fn aggregate_key(user_id: &str) -> String {
    format!("searches/user:{user_id}")
}

/// Memoized union scoped to one named list.
pub fn aggregate_named_key(user_id: &str, name: &str) -> String {
    format!("searches/user:{user_id}:{name}")
}

/// Scan pattern matching all of a user's named-list aggregates.
pub fn aggregate_named_pattern(user_id: &str) -> String {
    format!("searches/user:{user_id}:*")
}

/// Encodes a cleanup backlog entry.
pub fn cleanup_request(user_id: &str, query: &str) -> String {
    format!("{user_id}:{query}")
}

/// Splits a cleanup backlog entry into `(user_id, query)`.
///
/// Splits at the first colon only - queries themselves may contain
/// colons (e.g. metatag syntax like `rating:safe`).
pub fn parse_cleanup_request(item: &str) -> Option<(&str, &str)> {
    item.split_once(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(search_key("cat dog"), "searches:cat dog");
        assert_eq!(user_key("1"), "users:1");
        assert_eq!(user_category_key("1", "fav"), "users:1:fav");
        assert_eq!(aggregate_key("1"), "searches/user:1");
        assert_eq!(aggregate_named_key("1", "fav"), "searches/user:1:fav");
    }

    #[test]
    fn test_query_from_search_key() {
        assert_eq!(query_from_search_key("searches:cat dog"), Some("cat dog"));
        assert_eq!(query_from_search_key("users:1"), None);
    }

    #[test]
    fn test_cleanup_request_round_trip() {
        let item = cleanup_request("12", "rating:safe cat");
        assert_eq!(parse_cleanup_request(&item), Some(("12", "rating:safe cat")));
    }

    #[test]
    fn test_cleanup_request_malformed() {
        assert_eq!(parse_cleanup_request("no-colon"), None);
    }
}
