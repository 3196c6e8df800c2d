//! Catalog API Tests

use axum::http::StatusCode;
use uuid::Uuid;

use crate::common::{cents, money, TestApp};

#[tokio::test]
async fn test_get_product_with_discount() {
    let app = TestApp::new();
    let game = app.seed_product("Starfall", 5999).await;
    app.seed_discount(game.id, 50).await;

    let (status, json) = app
        .get(&format!("/api/v1/catalog/products/{}", game.id), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Starfall");
    assert_eq!(money(&json["base_price"]), cents(5999));
    assert_eq!(money(&json["price"]), cents(3000));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let app = TestApp::new();

    let (status, json) = app
        .get(&format!("/api/v1/catalog/products/{}", Uuid::now_v7()), None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], 10001);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/v1/catalog/bundles/not-an-id", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_bundle_lists_shares() {
    let app = TestApp::new();
    let a = app.seed_product("A", 3000).await;
    let b = app.seed_product("B", 1000).await;
    let bundle = app
        .seed_bundle("Pair", 3000, &[(a.id, 2250), (b.id, 750)])
        .await;

    let (status, json) = app
        .get(&format!("/api/v1/catalog/bundles/{}", bundle.id), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&json["price"]), cents(3000));
    assert_eq!(money(&json["original_total"]), cents(4000));
    let members = json["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(money(&members[0]["share"]), cents(2250));
}
