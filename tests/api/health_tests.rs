//! Health Check API Tests

use axum::http::StatusCode;

use crate::common::TestApp;

/// Test basic health check endpoint returns 200 OK with a status field
#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new();

    let (status, json) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

/// Liveness never depends on storage
#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new();

    let (status, json) = app.get("/health/live", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "alive");
}

/// Readiness reports the storage backend
#[tokio::test]
async fn test_readiness_probe_reports_memory_backend() {
    let app = TestApp::new();

    let (status, json) = app.get("/health/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["storage"]["backend"], "memory");
}

/// Metrics are exposed in Prometheus text format
#[tokio::test]
async fn test_metrics_endpoint_exposes_counters() {
    let app = TestApp::new();
    let game = app.seed_product("Starfall", 1000).await;
    app.post(
        "/api/v1/cart/items",
        Some(uuid::Uuid::now_v7()),
        serde_json::json!({ "product_id": game.id }),
    )
    .await;

    let (status, body) = app.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("game_store_cart_mutations_total"));
}
