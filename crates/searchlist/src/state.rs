//! Shared application state.

use std::sync::Arc;

use anyhow::Result;

use searchlist_core::queue::QueueProducer;
use searchlist_core::store::Store;

use crate::config::Config;
use crate::queue::SqsQueue;
use crate::store::RedisStore;

/// Shared state cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub queue: Arc<dyn QueueProducer>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, queue: Arc<dyn QueueProducer>, config: Arc<Config>) -> Self {
        Self {
            store,
            queue,
            config,
        }
    }

    /// Builds the production state: Redis store and SQS producer.
    pub async fn from_env(config: Config) -> Result<Self> {
        let store = Arc::new(RedisStore::new(&config.redis_url).await?);
        let queue = Arc::new(SqsQueue::from_env(&config.queue_url).await);
        Ok(Self::new(store, queue, Arc::new(config)))
    }
}
