//! HTTP client for the origin tag-search API.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use searchlist_core::origin::{OriginError, Result, SearchOrigin};

/// HTTP client against the origin's `/posts.json` search endpoint.
#[derive(Debug, Clone)]
pub struct OriginClient {
    client: reqwest::Client,
    base_url: String,
    login: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: u64,
}

impl OriginClient {
    pub fn new(base_url: &str, login: Option<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            login,
            api_key,
        }
    }
}

#[async_trait]
impl SearchOrigin for OriginClient {
    async fn fetch(
        &self,
        query: &str,
        newer_than: Option<NaiveDate>,
        limit: usize,
    ) -> Result<Option<Vec<u64>>> {
        let tags = match newer_than {
            Some(date) => format!("{query} date:>{}", date.format("%Y-%m-%d")),
            None => query.to_string(),
        };

        let mut request = self
            .client
            .get(format!("{}/posts.json", self.base_url))
            .query(&[("tags", tags.as_str()), ("limit", &limit.to_string())]);
        if let (Some(login), Some(api_key)) = (&self.login, &self.api_key) {
            request = request.query(&[("login", login.as_str()), ("api_key", api_key.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OriginError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                query,
                "Origin search returned a non-success status"
            );
            return Ok(None);
        }

        let posts: Vec<Post> = response
            .json()
            .await
            .map_err(|e| OriginError::Malformed(e.to_string()))?;
        Ok(Some(posts.into_iter().map(|p| p.id).collect()))
    }
}

/// Scripted origin for exercising the refresh paths without a server.
#[cfg(test)]
pub mod scripted {
    use std::collections::HashMap;
    use std::sync::Arc;

    use tokio::sync::Mutex;

    use super::*;

    /// A recorded fetch call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FetchCall {
        pub query: String,
        pub newer_than: Option<NaiveDate>,
        pub limit: usize,
    }

    /// Origin that answers from a fixed table of responses. Queries
    /// without a scripted answer behave like a soft origin failure.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedOrigin {
        responses: Arc<Mutex<HashMap<String, Vec<u64>>>>,
        calls: Arc<Mutex<Vec<FetchCall>>>,
    }

    impl ScriptedOrigin {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn script(&self, query: &str, ids: Vec<u64>) {
            self.responses.lock().await.insert(query.to_string(), ids);
        }

        pub async fn calls(&self) -> Vec<FetchCall> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl SearchOrigin for ScriptedOrigin {
        async fn fetch(
            &self,
            query: &str,
            newer_than: Option<NaiveDate>,
            limit: usize,
        ) -> Result<Option<Vec<u64>>> {
            self.calls.lock().await.push(FetchCall {
                query: query.to_string(),
                newer_than,
                limit,
            });
            Ok(self.responses.lock().await.get(query).cloned())
        }
    }
}
