use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL (default: "redis://localhost:6379")
    pub redis_url: String,
    /// Invalidation queue URL.
    pub queue_url: String,
    /// Shared secret required by the read API.
    pub auth_key: String,
    /// Base URL of the origin search API.
    pub origin_url: String,
    /// Origin API login, sent alongside requests when set.
    pub origin_login: Option<String>,
    /// Origin API key, sent alongside requests when set.
    pub origin_api_key: Option<String>,
    /// Size bound of every query cache and aggregate (default: 100)
    pub max_posts_per_search: usize,
    /// Per-user bound on saved searches (default: 100)
    pub max_searches_per_user: u64,
    /// Query cache TTL in seconds (default: 259,200 = 3 days)
    pub cache_expiry_seconds: u64,
    /// Aggregate cache TTL in seconds (default: 3,600)
    pub aggregate_ttl_seconds: u64,
    /// Rolling window for refresh fetches, in days (default: 3)
    pub refresh_window_days: u64,
    /// Consumer cooldown after a fault, in seconds (default: 60)
    pub consumer_cooldown_seconds: u64,
    /// Cleanup backlog entries drained per refresh pass (default: 1,000)
    pub cleanup_batch_limit: usize,
    /// Items requested per origin call (default: 100)
    pub seed_fetch_limit: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `REDIS_URL` - Redis connection URL
    /// - `SEARCHLIST_QUEUE_URL` - invalidation queue URL
    /// - `SEARCHLIST_AUTH_KEY` - shared secret for the read API
    /// - `ORIGIN_URL`, `ORIGIN_LOGIN`, `ORIGIN_API_KEY` - origin search API
    /// - `MAX_POSTS_PER_SEARCH`, `MAX_SEARCHES_PER_USER`
    /// - `CACHE_EXPIRY_SECONDS`, `AGGREGATE_TTL_SECONDS`
    /// - `REFRESH_WINDOW_DAYS`, `CONSUMER_COOLDOWN_SECONDS`
    /// - `CLEANUP_BATCH_LIMIT`, `SEED_FETCH_LIMIT`
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            queue_url: env::var("SEARCHLIST_QUEUE_URL").unwrap_or_default(),
            auth_key: env::var("SEARCHLIST_AUTH_KEY").unwrap_or_default(),
            origin_url: env::var("ORIGIN_URL").unwrap_or_default(),
            origin_login: env::var("ORIGIN_LOGIN").ok(),
            origin_api_key: env::var("ORIGIN_API_KEY").ok(),
            max_posts_per_search: parse_env("MAX_POSTS_PER_SEARCH", 100),
            max_searches_per_user: parse_env("MAX_SEARCHES_PER_USER", 100),
            cache_expiry_seconds: parse_env("CACHE_EXPIRY_SECONDS", 259_200),
            aggregate_ttl_seconds: parse_env("AGGREGATE_TTL_SECONDS", 3_600),
            refresh_window_days: parse_env("REFRESH_WINDOW_DAYS", 3),
            consumer_cooldown_seconds: parse_env("CONSUMER_COOLDOWN_SECONDS", 60),
            cleanup_batch_limit: parse_env("CLEANUP_BATCH_LIMIT", 1_000),
            seed_fetch_limit: parse_env("SEED_FETCH_LIMIT", 100),
        }
    }

    /// Get the query cache TTL as a Duration.
    pub fn cache_expiry(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_seconds)
    }

    /// Get the aggregate cache TTL as a Duration.
    pub fn aggregate_ttl(&self) -> Duration {
        Duration::from_secs(self.aggregate_ttl_seconds)
    }

    /// Get the consumer fault cooldown as a Duration.
    pub fn consumer_cooldown(&self) -> Duration {
        Duration::from_secs(self.consumer_cooldown_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
impl Config {
    /// Fixed configuration for tests, independent of the environment.
    pub fn for_tests() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            queue_url: String::new(),
            auth_key: "test-key".to_string(),
            origin_url: String::new(),
            origin_login: None,
            origin_api_key: None,
            max_posts_per_search: 100,
            max_searches_per_user: 100,
            cache_expiry_seconds: 259_200,
            aggregate_ttl_seconds: 3_600,
            refresh_window_days: 3,
            consumer_cooldown_seconds: 0,
            cleanup_batch_limit: 1_000,
            seed_fetch_limit: 100,
        }
    }
}
