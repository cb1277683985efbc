//! Invalidation queue consumer.
//!
//! A single loop pulls command batches off the queue and applies them
//! sequentially. Every apply is idempotent, so the at-least-once
//! delivery of the transport is safe: a batch interrupted by a store
//! fault is simply left unacknowledged and redelivered.

use std::sync::Arc;

use tokio::sync::broadcast;

use searchlist_core::command::{Command, CommandError, DeleteScope};
use searchlist_core::queue::QueueConsumer;
use searchlist_core::store::{keys, Result as StoreResult, Store};

use crate::config::Config;

/// Applies invalidation commands to the store.
pub struct Consumer {
    store: Arc<dyn Store>,
    queue: Arc<dyn QueueConsumer>,
    config: Arc<Config>,
}

impl Consumer {
    pub fn new(store: Arc<dyn Store>, queue: Arc<dyn QueueConsumer>, config: Arc<Config>) -> Self {
        Self {
            store,
            queue,
            config,
        }
    }

    /// Polls the queue until the shutdown channel fires. The batch in
    /// flight when shutdown arrives is processed to completion.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            let batch = tokio::select! {
                _ = shutdown.recv() => break,
                received = self.queue.receive() => match received {
                    Ok(batch) => batch,
                    Err(error) => {
                        tracing::error!(%error, "Queue receive failed");
                        tokio::time::sleep(self.config.consumer_cooldown()).await;
                        continue;
                    }
                },
            };

            for message in &batch {
                match Command::parse(&message.body) {
                    Ok(command) => {
                        if let Err(error) = self.apply(&command).await {
                            // Leave the rest of the batch unacknowledged;
                            // redelivery retries it after the cooldown.
                            tracing::error!(%error, body = %message.body, "Failed to apply command");
                            tokio::time::sleep(self.config.consumer_cooldown()).await;
                            break;
                        }
                    }
                    Err(CommandError::UnknownVerb(verb)) => {
                        tracing::debug!(verb, "Skipping unknown command verb");
                    }
                    Err(error) => {
                        tracing::error!(%error, body = %message.body, "Dropping malformed command");
                    }
                }

                if let Err(error) = self.queue.acknowledge(message).await {
                    tracing::error!(%error, "Failed to acknowledge command");
                }
            }
        }
        tracing::info!("Consumer stopped");
    }

    /// Applies one command to the store.
    pub async fn apply(&self, command: &Command) -> StoreResult<()> {
        tracing::info!(command = %command.encode().replace('\n', " "), "Applying command");

        match command {
            Command::Delete { user_id, scope } => self.apply_delete(user_id, scope).await,
            Command::Create {
                user_id,
                category,
                query,
            } => self.apply_create(user_id, category.as_deref(), query.as_str()).await,
            Command::Refresh { user_id } => {
                self.store
                    .expire(&keys::aggregate_key(user_id), self.config.aggregate_ttl())
                    .await
            }
            Command::Update {
                user_id,
                old_category,
                old_query,
                new_category,
                new_query,
            } => {
                self.apply_update(
                    user_id,
                    old_category,
                    old_query.as_str(),
                    new_category,
                    new_query.as_str(),
                )
                .await
            }
            Command::CleanGlobal { user_id, query } => {
                self.refresh_aggregate(&keys::aggregate_key(user_id)).await?;
                self.touch_search(query).await
            }
            Command::CleanNamed {
                user_id,
                name,
                query,
            } => {
                self.refresh_aggregate(&keys::aggregate_key(user_id)).await?;
                self.refresh_aggregate(&keys::aggregate_named_key(user_id, name))
                    .await?;
                self.touch_search(query).await
            }
        }
    }

    async fn apply_delete(&self, user_id: &str, scope: &DeleteScope) -> StoreResult<()> {
        match scope {
            DeleteScope::All => {
                self.store.delete(&keys::user_key(user_id)).await?;
                for key in self
                    .store
                    .scan(&keys::user_category_pattern(user_id))
                    .await?
                {
                    self.store.delete(&key).await?;
                }
                self.store.delete(&keys::aggregate_key(user_id)).await?;
                for key in self
                    .store
                    .scan(&keys::aggregate_named_pattern(user_id))
                    .await?
                {
                    self.store.delete(&key).await?;
                }
                Ok(())
            }
            DeleteScope::Category { category, query } => {
                self.store
                    .set_remove(&keys::user_key(user_id), query.as_str())
                    .await?;
                self.store
                    .set_remove(&keys::user_category_key(user_id, category), query.as_str())
                    .await
            }
        }
    }

    async fn apply_create(
        &self,
        user_id: &str,
        category: Option<&str>,
        query: &str,
    ) -> StoreResult<()> {
        let saved = self.store.set_size(&keys::user_key(user_id)).await?;
        if saved >= self.config.max_searches_per_user {
            tracing::warn!(user_id, "Saved-search limit reached, ignoring create");
            return Ok(());
        }

        if self.store.sorted_size(&keys::search_key(query)).await? == 0 {
            self.store.set_add(keys::SEED_BACKLOG_KEY, query).await?;
        }
        if let Some(category) = category {
            self.store
                .set_add(&keys::user_category_key(user_id, category), query)
                .await?;
        }
        self.store.set_add(&keys::user_key(user_id), query).await
    }

    async fn apply_update(
        &self,
        user_id: &str,
        old_category: &str,
        old_query: &str,
        new_category: &str,
        new_query: &str,
    ) -> StoreResult<()> {
        self.store
            .set_remove(&keys::user_key(user_id), old_query)
            .await?;
        self.store
            .set_add(&keys::user_key(user_id), new_query)
            .await?;
        self.store
            .set_remove(&keys::user_category_key(user_id, old_category), old_query)
            .await?;
        self.store
            .set_add(&keys::user_category_key(user_id, new_category), new_query)
            .await?;

        if self.store.sorted_size(&keys::search_key(new_query)).await? == 0 {
            self.store
                .set_add(keys::SEED_BACKLOG_KEY, new_query)
                .await?;
        }
        Ok(())
    }

    /// Trims an aggregate to the configured bound and restarts its TTL.
    async fn refresh_aggregate(&self, key: &str) -> StoreResult<()> {
        self.store
            .sorted_trim(key, self.config.max_posts_per_search)
            .await?;
        self.store.expire(key, self.config.aggregate_ttl()).await
    }

    /// Re-seeds an emptied query cache or restarts its TTL.
    async fn touch_search(&self, query: &str) -> StoreResult<()> {
        let key = keys::search_key(query);
        if self.store.sorted_size(&key).await? == 0 {
            self.store.set_add(keys::SEED_BACKLOG_KEY, query).await
        } else {
            self.store.expire(&key, self.config.cache_expiry()).await
        }
    }
}
