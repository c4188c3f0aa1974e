//! Rate-limit middleware behavior over the real router

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use common::{body_json, test_app_with};
use vibewatch::config::Config;

fn quota_request(client: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/api/v1/quota")
        .header("x-user-id", client)
        .body(Body::empty())
        .unwrap()
}

fn limited_config(requests_per_window: u32) -> Config {
    let mut config = Config::default();
    config.server.rate_limit.enabled = true;
    config.server.rate_limit.requests_per_window = requests_per_window;
    config.server.rate_limit.window_seconds = 60;
    config
}

#[tokio::test]
async fn requests_past_the_limit_get_429_with_headers() {
    let app = test_app_with(limited_config(3), "http://127.0.0.1:9").await;

    for i in 0..3 {
        let response = app
            .router
            .clone()
            .oneshot(quota_request("u-1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "request {}", i);
        assert_eq!(response.headers()["x-ratelimit-limit"], "3");
    }

    let rejected = app
        .router
        .clone()
        .oneshot(quota_request("u-1"))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(rejected.headers()["x-ratelimit-remaining"], "0");
    assert!(rejected.headers().contains_key("x-ratelimit-reset"));
    assert_eq!(body_json(rejected).await["code"], "RATE_LIMIT_EXCEEDED");
}

#[tokio::test]
async fn distinct_clients_have_independent_windows() {
    let app = test_app_with(limited_config(1), "http://127.0.0.1:9").await;

    let first = app
        .router
        .clone()
        .oneshot(quota_request("u-1"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let rejected = app
        .router
        .clone()
        .oneshot(quota_request("u-1"))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = app
        .router
        .clone()
        .oneshot(quota_request("u-2"))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn remaining_header_counts_down() {
    let app = test_app_with(limited_config(3), "http://127.0.0.1:9").await;

    let expected = ["2", "1", "0"];
    for remaining in expected {
        let response = app
            .router
            .clone()
            .oneshot(quota_request("u-1"))
            .await
            .unwrap();
        assert_eq!(response.headers()["x-ratelimit-remaining"], remaining);
    }
}

#[tokio::test]
async fn liveness_probe_is_not_rate_limited() {
    let app = test_app_with(limited_config(1), "http://127.0.0.1:9").await;

    for _ in 0..5 {
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
