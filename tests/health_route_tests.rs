mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use common::{MemoryStore, app};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn get_health() -> Request<Body> {
    Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("failed to build request")
}

#[tokio::test]
async fn health_is_ok_when_store_answers() {
    let app = app(Arc::new(MemoryStore::default()));

    let resp = app.oneshot(get_health()).await.expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body: Value = serde_json::from_slice(&body).expect("response body was not JSON");
    assert_eq!(body, json!({ "status": "ok", "service": "items-test" }));
}

#[tokio::test]
async fn health_is_unavailable_when_store_is_down() {
    let store = Arc::new(MemoryStore::default());
    store.set_down(true);
    let app = app(store);

    let resp = app.oneshot(get_health()).await.expect("request failed");
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body: Value = serde_json::from_slice(&body).expect("response body was not JSON");
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["error"], sqlx::Error::PoolClosed.to_string());
    assert!(body.get("service").is_none());
}

#[tokio::test]
async fn health_recovers_when_store_returns() {
    let store = Arc::new(MemoryStore::default());
    let app = app(store.clone());

    store.set_down(true);
    let resp = app.clone().oneshot(get_health()).await.expect("request failed");
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    store.set_down(false);
    let resp = app.oneshot(get_health()).await.expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}
