//! Integration tests for the instrumented router.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use instrumented_http::api::create_router;
use instrumented_http::app::{AppState, HealthConfig, ServerConfig};
use instrumented_http::infra::{ServerMetrics, build_registry};

fn create_test_state(health: HealthConfig) -> Arc<AppState> {
    let metrics = Arc::new(ServerMetrics::new().unwrap());
    let registry = build_registry(&metrics).unwrap();
    let config = ServerConfig {
        health,
        ..ServerConfig::default()
    };
    Arc::new(AppState::new(metrics, registry, config))
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_ten_health_requests_are_counted_and_timed() {
    let state = create_test_state(HealthConfig::always_healthy());
    let router = create_router(Arc::clone(&state));

    for _ in 0..10 {
        let (status, _) = get(&router, "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(state.metrics.request_count("GET", "/health", 200), 10);
    let snapshot = state.metrics.latency_snapshot("GET", "/health").unwrap();
    assert_eq!(snapshot.count, 10);
    assert!(snapshot.sum >= 0.0);
    // Every observation under one second means the sum is too.
    assert!(snapshot.sum < 10.0);

    let (_, body) = get(&router, "/metrics").await;
    assert!(body.contains(r#"http_request_latency_seconds_bucket{method="GET",path="/health",le="1"} 10"#));
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_text_format() {
    let state = create_test_state(HealthConfig::always_healthy());
    let router = create_router(Arc::clone(&state));

    get(&router, "/health").await;
    get(&router, "/health").await;

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("# HELP http_requests_total Total number of HTTP requests."));
    assert!(body.contains(r#"http_requests_total{code="200",method="GET",path="/health"} 2"#));
    assert!(body.contains(r#"http_request_latency_seconds_count{method="GET",path="/health"} 2"#));
}

#[tokio::test]
async fn test_failing_handler_status_is_preserved() {
    let state = create_test_state(HealthConfig {
        max_delay: std::time::Duration::ZERO,
        failure_rate: 1.0,
    });
    let router = create_router(Arc::clone(&state));

    let (status, body) = get(&router, "/health").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("unhealthy"));
    assert_eq!(state.metrics.request_count("GET", "/health", 500), 1);
    assert_eq!(state.metrics.request_count("GET", "/health", 200), 0);
}

#[tokio::test]
async fn test_random_outcomes_keep_counter_and_histogram_in_step() {
    let state = create_test_state(HealthConfig {
        max_delay: std::time::Duration::from_millis(5),
        failure_rate: 0.5,
    });
    let router = create_router(Arc::clone(&state));

    for _ in 0..20 {
        get(&router, "/health").await;
    }

    let ok = state.metrics.request_count("GET", "/health", 200);
    let failed = state.metrics.request_count("GET", "/health", 500);
    assert_eq!(ok + failed, 20);
    assert_eq!(state.metrics.latency_snapshot("GET", "/health").unwrap().count, 20);
}

#[tokio::test]
async fn test_independent_registries_do_not_share_state() {
    let first = create_test_state(HealthConfig::always_healthy());
    let second = create_test_state(HealthConfig::always_healthy());

    get(&create_router(Arc::clone(&first)), "/health").await;

    assert_eq!(first.metrics.request_count("GET", "/health", 200), 1);
    assert_eq!(second.metrics.request_count("GET", "/health", 200), 0);

    let (_, body) = get(&create_router(second), "/metrics").await;
    assert!(!body.contains(r#"path="/health""#));
}
