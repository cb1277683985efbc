use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use searchlist_core::store::{Result, Store};

use super::error::map_redis_error;

/// Redis store backend using connection manager for pooling.
pub struct RedisStore {
    conn: redis::aio::ConnectionManager,
}

impl RedisStore {
    /// Creates a new Redis store connection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConnectionFailed` if the connection cannot
    /// be established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn set_add(&self, key: &str, member: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.sadd::<_, _, ()>(key, member)
            .await
            .map_err(map_redis_error)
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.srem::<_, _, ()>(key, member)
            .await
            .map_err(map_redis_error)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        conn.smembers(key).await.map_err(map_redis_error)
    }

    async fn set_size(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        conn.scard(key).await.map_err(map_redis_error)
    }

    async fn set_pop(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        conn.spop(key).await.map_err(map_redis_error)
    }

    async fn sorted_insert(&self, key: &str, entries: &[(f64, String)]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        conn.zadd_multiple::<_, _, _, ()>(key, entries)
            .await
            .map_err(map_redis_error)
    }

    async fn sorted_size(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        conn.zcard(key).await.map_err(map_redis_error)
    }

    async fn sorted_trim(&self, key: &str, max: usize) -> Result<()> {
        let mut conn = self.conn.clone();
        // Ranks count from the lowest score; everything below the top
        // `max` goes.
        let stop = -(max as isize) - 1;
        conn.zremrangebyrank::<_, ()>(key, 0, stop)
            .await
            .map_err(map_redis_error)
    }

    async fn sorted_union(&self, dest: &str, sources: &[String]) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.zunionstore::<_, _, ()>(dest, sources)
            .await
            .map_err(map_redis_error)
    }

    async fn sorted_rev_range(&self, key: &str, limit: usize) -> Result<Vec<String>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        conn.zrevrange(key, 0, limit as isize - 1)
            .await
            .map_err(map_redis_error)
    }

    async fn list_push(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(key, value)
            .await
            .map_err(map_redis_error)
    }

    async fn list_pop(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        conn.lpop(key, None).await.map_err(map_redis_error)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.expire::<_, ()>(key, ttl.as_secs() as i64)
            .await
            .map_err(map_redis_error)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        conn.exists(key).await.map_err(map_redis_error)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(map_redis_error)
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let mut keys = Vec::new();
        {
            let mut iter = conn
                .scan_match::<_, String>(pattern)
                .await
                .map_err(map_redis_error)?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}
