//! Counter endpoints
//!
//! GET /count reads, POST /count applies a signed delta.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::counter::CounterService;
use crate::http::error::ApiError;
use crate::http::extractors::ValidJson;

/// Increment request
#[derive(Debug, Deserialize)]
pub struct IncrementRequest {
    pub count: i64,
}

/// GET /count response
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub current_count: i64,
}

/// POST /count response
#[derive(Debug, Serialize)]
pub struct IncrementResponse {
    pub incremented_by: i64,
    pub new_count: i64,
}

/// GET /count - current value
async fn get_count(
    State(counter): State<CounterService>,
) -> Result<Json<CountResponse>, ApiError> {
    let current_count = counter.read().await?;
    Ok(Json(CountResponse { current_count }))
}

/// POST /count - add `count` to the counter
async fn post_count(
    State(counter): State<CounterService>,
    ValidJson(req): ValidJson<IncrementRequest>,
) -> Result<Json<IncrementResponse>, ApiError> {
    let new_count = counter.increment(req.count).await?;
    Ok(Json(IncrementResponse {
        incremented_by: req.count,
        new_count,
    }))
}

/// Counter routes
pub fn router() -> Router<CounterService> {
    Router::new().route("/count", get(get_count).post(post_count))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::counter::{CounterStore, MemoryStore};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.ensure_initialized().await.unwrap();
        let counter = CounterService::new(store.clone());
        (router().with_state(counter), store)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, body)
    }

    fn get() -> Request<Body> {
        Request::builder().uri("/count").body(Body::empty()).unwrap()
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/count")
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn end_to_end_sequence() {
        let (app, _) = app().await;

        let (status, body) = send(&app, get()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"current_count": 0}));

        let (status, body) = send(&app, post(r#"{"count": 5}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"incremented_by": 5, "new_count": 5}));

        let (status, body) = send(&app, get()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"current_count": 5}));

        let (status, body) = send(&app, post(r#"{"count": -3}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"incremented_by": -3, "new_count": 2}));
    }

    #[tokio::test]
    async fn malformed_bodies_are_400() {
        let (app, store) = app().await;

        for body in [
            r#"{"count": "5"}"#,
            r#"{"count": 1.5}"#,
            r#"{"count": 99999999999999999999}"#,
            r#"{}"#,
            r#"not json"#,
        ] {
            let (status, body_json) = send(&app, post(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(body_json["error"], "validation_error");
        }

        assert_eq!(store.fetch_value().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn store_outage_is_500_and_value_survives() {
        let (app, store) = app().await;
        send(&app, post(r#"{"count": 10}"#)).await;

        store.set_available(false);
        let (status, body) = send(&app, post(r#"{"count": 1}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.get("new_count").is_none());

        let (status, _) = send(&app, get()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        store.set_available(true);
        let (_, body) = send(&app, get()).await;
        assert_eq!(body, json!({"current_count": 10}));
    }

    #[tokio::test]
    async fn concurrent_posts_all_land() {
        let (app, _) = app().await;

        let requests = (0..200).map(|_| {
            let app = app.clone();
            async move { send(&app, post(r#"{"count": 1}"#)).await.0 }
        });
        let statuses = futures::future::join_all(requests).await;
        assert!(statuses.iter().all(|s| *s == StatusCode::OK));

        let (_, body) = send(&app, get()).await;
        assert_eq!(body, json!({"current_count": 200}));
    }
}
