//! Periodic refresh job.
//!
//! One pass runs three phases in order: seed caches for queries on the
//! seed backlog, refresh every known query cache with recent items,
//! then drain the cleanup backlog. Scheduling the pass and keeping two
//! passes from overlapping is the external scheduler's concern.

use std::sync::Arc;

use chrono::{Days, Utc};

use searchlist_core::origin::SearchOrigin;
use searchlist_core::store::{keys, Store};

use crate::config::Config;

/// Runs the three refresh phases against the store.
pub struct RefreshJob {
    store: Arc<dyn Store>,
    origin: Arc<dyn SearchOrigin>,
    config: Arc<Config>,
}

impl RefreshJob {
    pub fn new(store: Arc<dyn Store>, origin: Arc<dyn SearchOrigin>, config: Arc<Config>) -> Self {
        Self {
            store,
            origin,
            config,
        }
    }

    /// Executes one full pass. Transport faults abort the pass so the
    /// scheduler's retry policy can see the failure.
    pub async fn run(&self) -> anyhow::Result<()> {
        self.seed_pending().await?;
        self.refresh_known().await?;
        self.drain_cleanup().await?;
        Ok(())
    }

    /// Populates caches for queries waiting on the seed backlog.
    async fn seed_pending(&self) -> anyhow::Result<()> {
        tracing::info!("Seeding pending searches");

        while let Some(query) = self.store.set_pop(keys::SEED_BACKLOG_KEY).await? {
            let key = keys::search_key(&query);
            if self.store.sorted_size(&key).await? > 0 {
                continue;
            }

            let Some(ids) = self
                .origin
                .fetch(&query, None, self.config.seed_fetch_limit)
                .await?
            else {
                // Soft failure: the slot stays empty and the query will
                // re-enter the backlog through the next cleanup.
                continue;
            };

            if !ids.is_empty() {
                self.store.sorted_insert(&key, &score_by_id(&ids)).await?;
                self.store
                    .sorted_trim(&key, self.config.max_posts_per_search)
                    .await?;
            }
            self.store.expire(&key, self.config.cache_expiry()).await?;
        }
        Ok(())
    }

    /// Merges recent items into every existing query cache.
    async fn refresh_known(&self) -> anyhow::Result<()> {
        tracing::info!("Refreshing known searches");

        let min_date = Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(self.config.refresh_window_days))
            .unwrap_or_default();

        for key in self.store.scan(keys::SEARCH_KEY_PATTERN).await? {
            let Some(query) = keys::query_from_search_key(&key) else {
                continue;
            };

            let Some(ids) = self
                .origin
                .fetch(query, Some(min_date), self.config.seed_fetch_limit)
                .await?
            else {
                continue;
            };

            if !ids.is_empty() {
                // Merge without resetting the TTL: only reads keep a
                // cache alive.
                self.store.sorted_insert(&key, &score_by_id(&ids)).await?;
                self.store
                    .sorted_trim(&key, self.config.max_posts_per_search)
                    .await?;
            }
        }
        Ok(())
    }

    /// Drains a bounded slice of the cleanup backlog.
    async fn drain_cleanup(&self) -> anyhow::Result<()> {
        tracing::info!("Draining cleanup backlog");

        for _ in 0..self.config.cleanup_batch_limit {
            let Some(item) = self.store.list_pop(keys::CLEANUP_BACKLOG_KEY).await? else {
                break;
            };
            let Some((user_id, query)) = keys::parse_cleanup_request(&item) else {
                tracing::warn!(item, "Dropping malformed cleanup request");
                continue;
            };

            self.store
                .sorted_trim(&keys::aggregate_key(user_id), self.config.max_posts_per_search)
                .await?;

            let key = keys::search_key(query);
            if self.store.sorted_size(&key).await? == 0 {
                self.store.set_add(keys::SEED_BACKLOG_KEY, query).await?;
            } else {
                self.store.expire(&key, self.config.cache_expiry()).await?;
            }
        }
        Ok(())
    }
}

fn score_by_id(ids: &[u64]) -> Vec<(f64, String)> {
    ids.iter().map(|&id| (id as f64, id.to_string())).collect()
}
