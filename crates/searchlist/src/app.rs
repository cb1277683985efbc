use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{health::healthz, users::get_users},
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/users", get(get_users))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use searchlist_core::command::Command;
    use searchlist_core::store::Store;

    use super::*;
    use crate::config::Config;
    use crate::consumer::Consumer;
    use crate::job::RefreshJob;
    use crate::origin::scripted::ScriptedOrigin;
    use crate::queue::MemoryQueue;
    use crate::store::MemoryStore;

    struct Harness {
        store: Arc<MemoryStore>,
        queue: Arc<MemoryQueue>,
        origin: Arc<ScriptedOrigin>,
        config: Arc<Config>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: Arc::new(MemoryStore::new()),
                queue: Arc::new(MemoryQueue::new()),
                origin: Arc::new(ScriptedOrigin::new()),
                config: Arc::new(Config::for_tests()),
            }
        }

        fn app(&self) -> Router {
            create_app(AppState::new(
                self.store.clone(),
                self.queue.clone(),
                self.config.clone(),
            ))
        }

        async fn apply(&self, body: &str) {
            Consumer::new(self.store.clone(), self.queue.clone(), self.config.clone())
                .apply(&Command::parse(body).unwrap())
                .await
                .unwrap();
        }

        async fn refresh(&self) {
            RefreshJob::new(self.store.clone(), self.origin.clone(), self.config.clone())
                .run()
                .await
                .unwrap();
        }

        /// Runs queued invalidation commands until the queue is empty.
        async fn drain_queue(&self) {
            use searchlist_core::queue::QueueConsumer;

            let consumer =
                Consumer::new(self.store.clone(), self.queue.clone(), self.config.clone());
            while self.queue.len().await > 0 {
                for message in self.queue.receive().await.unwrap() {
                    consumer
                        .apply(&Command::parse(&message.body).unwrap())
                        .await
                        .unwrap();
                }
            }
        }
    }

    async fn get_ids(app: Router, uri: &str) -> (StatusCode, Vec<u64>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        if status != StatusCode::OK {
            return (status, Vec::new());
        }
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_healthz() {
        let harness = Harness::new();
        let response = harness
            .app()
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_users_requires_the_shared_secret() {
        let harness = Harness::new();

        let (status, _) = get_ids(harness.app(), "/users?user_id=1").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = get_ids(harness.app(), "/users?user_id=1&key=wrong").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_global_read_after_create_and_refresh() {
        let harness = Harness::new();
        harness.origin.script("cat", vec![101, 103]).await;
        harness.origin.script("dog", vec![102]).await;

        harness.apply("create\n1\n\ncat").await;
        harness.apply("create\n1\n\ndog").await;
        harness.refresh().await;

        let (status, ids) = get_ids(harness.app(), "/users?user_id=1&key=test-key").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids, vec![103, 102, 101]);
    }

    #[tokio::test]
    async fn test_named_read_scopes_to_the_category() {
        let harness = Harness::new();
        harness.origin.script("cat", vec![101]).await;
        harness.origin.script("dog", vec![102]).await;

        harness.apply("create\n1\nfav\ncat").await;
        harness.apply("create\n1\nother\ndog").await;
        harness.refresh().await;

        let (status, ids) =
            get_ids(harness.app(), "/users?user_id=1&name=fav&key=test-key").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids, vec![101]);
    }

    #[tokio::test]
    async fn test_delete_all_empties_subsequent_reads() {
        let harness = Harness::new();
        harness.origin.script("cat", vec![101]).await;
        harness.apply("create\n1\nfav\ncat").await;
        harness.refresh().await;

        let (_, ids) = get_ids(harness.app(), "/users?user_id=1&key=test-key").await;
        assert_eq!(ids, vec![101]);

        harness.apply("delete\n1\nall").await;

        let (status, ids) = get_ids(harness.app(), "/users?user_id=1&key=test-key").await;
        assert_eq!(status, StatusCode::OK);
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_read_for_unknown_user_is_empty() {
        let harness = Harness::new();
        let (status, ids) = get_ids(harness.app(), "/users?user_id=404&key=test-key").await;
        assert_eq!(status, StatusCode::OK);
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_read_enqueues_cleanup_commands() {
        let harness = Harness::new();
        harness.origin.script("cat", vec![101]).await;
        harness.apply("create\n1\n\ncat").await;
        harness.refresh().await;

        get_ids(harness.app(), "/users?user_id=1&key=test-key").await;

        assert_eq!(harness.queue.bodies().await, vec!["clean global\n1\ncat"]);
        harness.drain_queue().await;
        // Applying the cleanup keeps the populated cache alive.
        assert!(harness.store.exists("searches:cat").await.unwrap());
    }
}
