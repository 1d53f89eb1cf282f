//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle for each endpoint, including the
//! fragmented-value path through a raised value-size cap.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use blockcache::{api::create_router, AppState, Config};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_test_app_with(Config {
        max_bytes: 16 * 1024 * 1024,
        shards: 16,
        ..Config::default()
    })
}

fn create_test_app_with(config: Config) -> Router {
    let state = AppState::from_config(&config).unwrap();
    create_router(state)
}

async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX).await.unwrap().to_vec()
}

async fn body_to_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}

fn put_request(key: &str, value: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/v1/kv/{key}"))
        .body(value.into())
        .unwrap()
}

fn get_request(key: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/v1/kv/{key}"))
        .body(Body::empty())
        .unwrap()
}

fn delete_request(key: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(format!("/v1/kv/{key}"))
        .body(Body::empty())
        .unwrap()
}

// == PUT Endpoint Tests ==

#[tokio::test]
async fn test_put_returns_created_with_location() {
    let app = create_test_app();

    let response = app
        .oneshot(put_request("greeting", "hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/v1/kv/greeting"
    );
}

#[tokio::test]
async fn test_put_empty_value_rejected() {
    let app = create_test_app();

    let response = app
        .oneshot(put_request("greeting", Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_put_oversize_value_rejected() {
    let app = create_test_app();

    let response = app
        .oneshot(put_request("big", vec![7u8; 48 * 1024]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_put_then_get_roundtrip() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(put_request("roundtrip", "opaque value bytes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get_request("roundtrip")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response.into_body()).await, b"opaque value bytes");
}

#[tokio::test]
async fn test_get_missing_returns_not_found() {
    let app = create_test_app();

    let response = app.oneshot(get_request("nonexistent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_large_value_roundtrip() {
    // raise the request cap so the fragmentation path is exercised end to end
    let app = create_test_app_with(Config {
        max_bytes: 64 * 1024 * 1024,
        shards: 16,
        max_value_size: 1024 * 1024,
        ..Config::default()
    });

    let value: Vec<u8> = (0..131_073u32).map(|i| i as u8).collect();

    let response = app
        .clone()
        .oneshot(put_request("large", value.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get_request("large")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let got = body_bytes(response.into_body()).await;
    assert_eq!(got.len(), value.len());
    assert_eq!(got, value);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_then_get() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_request("to_delete", "value"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(delete_request("to_delete"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_request("to_delete")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_returns_not_found() {
    let app = create_test_app();

    let response = app.oneshot(delete_request("nonexistent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Stats Endpoint Tests ==

#[tokio::test]
async fn test_stats_reflect_operations() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_request("counted", "value"))
        .await
        .unwrap();
    app.clone().oneshot(get_request("counted")).await.unwrap();
    app.clone().oneshot(get_request("missing")).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["entries_count"], 1);
    assert_eq!(json["delete_hits"], 0);
    assert_eq!(json["delete_misses"], 0);
    assert_eq!(json["collisions"], 0);
    assert!(json["cache_bytes"].as_u64().unwrap() > 0);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}
