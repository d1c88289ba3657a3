//! API Module
//!
//! HTTP API layer for job intake and inspection.

pub mod error;
pub mod fetcher;
pub mod health;
pub mod payload;

use crate::adding::AddingService;
use crate::job_pool::JobPool;
use crate::storage::{FetchStore, ResponseStore};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handles every handler works with.
#[derive(Clone)]
pub struct AppState {
    pub fetches: Arc<FetchStore>,
    pub responses: Arc<ResponseStore>,
    pub adding: Arc<AddingService>,
    pub jobs: Arc<JobPool>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState, max_body_size: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/fetcher", post(fetcher::create_fetcher))
        .route("/api/fetcher", get(fetcher::list_fetchers))
        .route("/api/fetcher/{id}", delete(fetcher::delete_fetcher))
        .route("/api/fetcher/{id}/history", get(fetcher::fetcher_history))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntakeConfig;
    use crate::executor::{Attempt, AttemptSignal};
    use crate::message::{Job, ResponseRecord};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    struct IdleAttempt;

    #[async_trait]
    impl Attempt for IdleAttempt {
        async fn execute(&self, _job: &Job, _scope: CancellationToken) -> AttemptSignal {
            Ok(())
        }
    }

    const TEST_BODY_LIMIT: usize = 256;

    fn state() -> AppState {
        let fetches = Arc::new(FetchStore::new());
        AppState {
            adding: Arc::new(
                AddingService::new(fetches.clone(), &IntakeConfig::default().url_pattern).unwrap(),
            ),
            fetches,
            responses: Arc::new(ResponseStore::new()),
            jobs: Arc::new(JobPool::new(Arc::new(IdleAttempt), Duration::from_secs(1200))),
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(body: impl Into<Body>) -> Request<Body> {
        Request::post("/api/fetcher")
            .header(CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    fn fetcher_body(url: &str, interval: i64) -> String {
        json!({ "url": url, "interval": interval }).to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let router = create_router(state(), TEST_BODY_LIMIT);
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_create_allocates_sequential_ids_and_starts_pollers() {
        let state = state();
        let router = create_router(state.clone(), TEST_BODY_LIMIT);

        let first = send(&router, post_json(fetcher_body("https://httpbin.org/range/15", 60))).await;
        let second = send(&router, post_json(fetcher_body("http://httpbin.org/delay/3", 10))).await;

        assert_eq!(first, (StatusCode::OK, json!({ "id": 0 })));
        assert_eq!(second, (StatusCode::OK, json!({ "id": 1 })));
        assert_eq!(state.jobs.running(), 2);
    }

    #[tokio::test]
    async fn test_create_without_content_type_is_accepted() {
        let router = create_router(state(), TEST_BODY_LIMIT);
        let request = Request::post("/api/fetcher")
            .body(Body::from(fetcher_body("https://httpbin.org/range/15", 60)))
            .unwrap();

        assert_eq!(send(&router, request).await, (StatusCode::OK, json!({ "id": 0 })));
    }

    #[tokio::test]
    async fn test_create_rejections() {
        let router = create_router(state(), TEST_BODY_LIMIT);
        let wrong_type = Request::post("/api/fetcher")
            .header(CONTENT_TYPE, "text/plain")
            .body(Body::from(fetcher_body("https://httpbin.org/range/15", 60)))
            .unwrap();

        let cases = [
            (
                wrong_type,
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Invalid or lack of Content-Type",
            ),
            (
                post_json("x".repeat(TEST_BODY_LIMIT + 1)),
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body must not be larger than 1MB.",
            ),
            (
                post_json(""),
                StatusCode::BAD_REQUEST,
                "Request body must not be empty.",
            ),
            (
                post_json(r#"{"url": "https://httpbin.org/range/15"}"#),
                StatusCode::BAD_REQUEST,
                "Missing interval field in JSON payload.",
            ),
            (
                post_json(fetcher_body("ftp://example.com", 60)),
                StatusCode::BAD_REQUEST,
                "URL path is not accepted.",
            ),
            (
                post_json(fetcher_body("https://httpbin.org/range/15", 0)),
                StatusCode::BAD_REQUEST,
                "Interval value must be greater than 0.",
            ),
        ];

        for (request, status, message) in cases {
            assert_eq!(
                send(&router, request).await,
                (status, json!({ "error": message }))
            );
        }
    }

    #[tokio::test]
    async fn test_list_fetchers() {
        let router = create_router(state(), TEST_BODY_LIMIT);
        send(&router, post_json(fetcher_body("https://httpbin.org/range/15", 60))).await;
        send(&router, post_json(fetcher_body("https://httpbin.org/delay/2", 5))).await;

        let (status, body) = send(&router, Request::get("/api/fetcher").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                { "id": 0, "url": "https://httpbin.org/range/15", "interval": 60 },
                { "id": 1, "url": "https://httpbin.org/delay/2", "interval": 5 },
            ])
        );
    }

    #[tokio::test]
    async fn test_delete_cancels_poller() {
        let state = state();
        let router = create_router(state.clone(), TEST_BODY_LIMIT);
        send(&router, post_json(fetcher_body("https://httpbin.org/range/15", 60))).await;

        let delete = || Request::delete("/api/fetcher/0").body(Body::empty()).unwrap();
        let first = send(&router, delete()).await;
        let second = send(&router, delete()).await;
        tokio::task::yield_now().await;

        assert_eq!(first, (StatusCode::OK, json!({ "id": 0 })));
        assert_eq!(
            second,
            (StatusCode::NOT_FOUND, json!({ "error": "Fetcher 0 not found" }))
        );
        assert_eq!(state.jobs.running(), 0);
        assert!(state.fetches.list().is_empty());
    }

    #[tokio::test]
    async fn test_history_renders_sentinel_as_null() {
        let state = state();
        let router = create_router(state.clone(), TEST_BODY_LIMIT);
        send(&router, post_json(fetcher_body("https://httpbin.org/range/15", 60))).await;

        for (content, duration) in [("abc", 0.25), ("null", 0.0)] {
            state.responses.append(ResponseRecord {
                key: 0,
                content: content.to_string(),
                duration,
            });
        }

        let (status, body) = send(
            &router,
            Request::get("/api/fetcher/0/history").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["response"], json!("abc"));
        assert_eq!(entries[0]["duration"], json!(0.25));
        assert_eq!(entries[1]["response"], Value::Null);
        assert!(entries[1]["created_at"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_history_of_unknown_fetcher() {
        let router = create_router(state(), TEST_BODY_LIMIT);
        let (status, body) = send(
            &router,
            Request::get("/api/fetcher/7/history").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Fetcher 7 not found" }));
    }
}
