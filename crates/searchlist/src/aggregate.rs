//! Memoized per-user aggregates.
//!
//! An aggregate is the rank-sum union of the user's query caches,
//! materialized on first read and served as-is until its key expires.
//! Existence of the aggregate key is the only memoization guard; the
//! check-then-union window is not atomic, and a concurrent reader may
//! recompute the same union. That is harmless, both writers produce
//! the same set.

use searchlist_core::command::Command;
use searchlist_core::queue::QueueProducer;
use searchlist_core::store::{keys, Result, Store};

use crate::dispatch;

/// Reads the user's global aggregate, computing it on a miss.
pub async fn global(
    store: &dyn Store,
    queue: &dyn QueueProducer,
    user_id: &str,
    limit: usize,
) -> Result<Vec<u64>> {
    let queries = store.set_members(&keys::user_key(user_id)).await?;
    if queries.is_empty() {
        return Ok(Vec::new());
    }

    let aggregate = keys::aggregate_key(user_id);
    if !store.exists(&aggregate).await? {
        let sources: Vec<String> = queries.iter().map(|q| keys::search_key(q)).collect();
        store.sorted_union(&aggregate, &sources).await?;

        let cleanups: Vec<String> = queries
            .iter()
            .map(|q| {
                Command::CleanGlobal {
                    user_id: user_id.to_string(),
                    query: q.clone(),
                }
                .encode()
            })
            .collect();
        dispatch::send(queue, &cleanups).await;
    }

    read_ids(store, &aggregate, limit).await
}

/// Reads one of the user's named-list aggregates, computing it on a miss.
pub async fn named(
    store: &dyn Store,
    queue: &dyn QueueProducer,
    user_id: &str,
    name: &str,
    limit: usize,
) -> Result<Vec<u64>> {
    let queries = store
        .set_members(&keys::user_category_key(user_id, name))
        .await?;
    if queries.is_empty() {
        return Ok(Vec::new());
    }

    let aggregate = keys::aggregate_named_key(user_id, name);
    if !store.exists(&aggregate).await? {
        let sources: Vec<String> = queries.iter().map(|q| keys::search_key(q)).collect();
        store.sorted_union(&aggregate, &sources).await?;

        let cleanups: Vec<String> = queries
            .iter()
            .map(|q| {
                Command::CleanNamed {
                    user_id: user_id.to_string(),
                    name: name.to_string(),
                    query: q.clone(),
                }
                .encode()
            })
            .collect();
        dispatch::send(queue, &cleanups).await;
    }

    read_ids(store, &aggregate, limit).await
}

async fn read_ids(store: &dyn Store, key: &str, limit: usize) -> Result<Vec<u64>> {
    let members = store.sorted_rev_range(key, limit).await?;
    Ok(members.iter().filter_map(|m| m.parse().ok()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::MemoryQueue;
    use crate::store::MemoryStore;

    fn entries(ids: &[u64]) -> Vec<(f64, String)> {
        ids.iter().map(|&id| (id as f64, id.to_string())).collect()
    }

    #[tokio::test]
    async fn test_global_returns_empty_for_unknown_user() {
        let store = MemoryStore::new();
        let queue = MemoryQueue::new();

        let ids = global(&store, &queue, "1", 100).await.unwrap();
        assert!(ids.is_empty());
        assert_eq!(queue.len().await, 0);
    }

    #[tokio::test]
    async fn test_global_unions_member_caches_descending() {
        let store = MemoryStore::new();
        let queue = MemoryQueue::new();
        store.set_add("users:1", "cat").await.unwrap();
        store.set_add("users:1", "dog").await.unwrap();
        store
            .sorted_insert("searches:cat", &entries(&[101, 103]))
            .await
            .unwrap();
        store
            .sorted_insert("searches:dog", &entries(&[102]))
            .await
            .unwrap();

        let ids = global(&store, &queue, "1", 100).await.unwrap();
        assert_eq!(ids, vec![103, 102, 101]);
    }

    #[tokio::test]
    async fn test_global_dispatches_one_cleanup_per_query() {
        let store = MemoryStore::new();
        let queue = MemoryQueue::new();
        store.set_add("users:1", "cat").await.unwrap();
        store
            .sorted_insert("searches:cat", &entries(&[101]))
            .await
            .unwrap();

        global(&store, &queue, "1", 100).await.unwrap();

        assert_eq!(queue.bodies().await, vec!["clean global\n1\ncat"]);
    }

    #[tokio::test]
    async fn test_global_serves_memoized_aggregate() {
        let store = MemoryStore::new();
        let queue = MemoryQueue::new();
        store.set_add("users:1", "cat").await.unwrap();
        store
            .sorted_insert("searches:cat", &entries(&[101]))
            .await
            .unwrap();

        let first = global(&store, &queue, "1", 100).await.unwrap();
        assert_eq!(first, vec![101]);

        // The underlying cache changes, but the stored aggregate wins
        // until it expires.
        store
            .sorted_insert("searches:cat", &entries(&[205]))
            .await
            .unwrap();
        let second = global(&store, &queue, "1", 100).await.unwrap();
        assert_eq!(second, vec![101]);
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_global_respects_limit() {
        let store = MemoryStore::new();
        let queue = MemoryQueue::new();
        store.set_add("users:1", "cat").await.unwrap();
        store
            .sorted_insert("searches:cat", &entries(&[1, 2, 3, 4, 5]))
            .await
            .unwrap();

        let ids = global(&store, &queue, "1", 3).await.unwrap();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[tokio::test]
    async fn test_named_scopes_to_the_category_set() {
        let store = MemoryStore::new();
        let queue = MemoryQueue::new();
        store.set_add("users:1", "cat").await.unwrap();
        store.set_add("users:1", "dog").await.unwrap();
        store.set_add("users:1:fav", "dog").await.unwrap();
        store
            .sorted_insert("searches:cat", &entries(&[101]))
            .await
            .unwrap();
        store
            .sorted_insert("searches:dog", &entries(&[102]))
            .await
            .unwrap();

        let ids = named(&store, &queue, "1", "fav", 100).await.unwrap();
        assert_eq!(ids, vec![102]);
        assert_eq!(queue.bodies().await, vec!["clean named\n1\nfav\ndog"]);
    }
}
