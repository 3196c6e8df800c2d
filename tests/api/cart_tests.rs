//! Cart API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::common::{cents, money, TestApp};

#[tokio::test]
async fn test_cart_requires_user_header() {
    let app = TestApp::new();

    let (status, json) = app.get("/api/v1/cart", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], 10003);
}

#[tokio::test]
async fn test_empty_cart_for_new_user() {
    let app = TestApp::new();

    let (status, json) = app.get("/api/v1/cart", Some(Uuid::now_v7())).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["id"].is_null());
    assert_eq!(money(&json["total"]), cents(0));
}

#[tokio::test]
async fn test_add_product_and_reject_duplicate() {
    let app = TestApp::new();
    let game = app.seed_product("Starfall", 2000).await;
    app.seed_discount(game.id, 10).await;
    let user = Some(Uuid::now_v7());

    // Act
    let (status, json) = app
        .post("/api/v1/cart/items", user, json!({ "product_id": game.id }))
        .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
    assert_eq!(money(&json["items"][0]["price"]), cents(1800));
    assert_eq!(money(&json["savings"]), cents(200));

    let (status, json) = app
        .post("/api/v1/cart/items", user, json!({ "product_id": game.id }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], 10005);
}

#[tokio::test]
async fn test_nil_product_id_fails_validation() {
    let app = TestApp::new();

    let (status, json) = app
        .post(
            "/api/v1/cart/items",
            Some(Uuid::now_v7()),
            json!({ "product_id": Uuid::nil() }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 10007);
    assert_eq!(json["errors"][0]["field"], "product_id");
}

#[tokio::test]
async fn test_bundle_replaces_standalone_line_and_removes_as_unit() {
    let app = TestApp::new();
    let a = app.seed_product("A", 3000).await;
    let b = app.seed_product("B", 1000).await;
    let bundle = app
        .seed_bundle("Pair", 3000, &[(a.id, 2250), (b.id, 750)])
        .await;
    let user = Some(Uuid::now_v7());

    app.post("/api/v1/cart/items", user, json!({ "product_id": a.id }))
        .await;
    let (status, json) = app
        .post("/api/v1/cart/bundles", user, json!({ "bundle_id": bundle.id }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["items"].as_array().unwrap().is_empty());
    assert_eq!(json["bundles"][0]["items"].as_array().unwrap().len(), 2);
    assert_eq!(money(&json["total"]), cents(3000));

    let line = json["bundles"][0]["items"][1]["id"].as_str().unwrap().to_string();
    let (status, json) = app
        .delete(&format!("/api/v1/cart/items/{}", line), user)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["bundles"].as_array().unwrap().is_empty());
    assert_eq!(money(&json["total"]), cents(0));
}

#[tokio::test]
async fn test_adding_bundle_twice_conflicts() {
    let app = TestApp::new();
    let a = app.seed_product("A", 3000).await;
    let bundle = app.seed_bundle("Solo", 2000, &[(a.id, 2000)]).await;
    let user = Some(Uuid::now_v7());
    let body = json!({ "bundle_id": bundle.id });

    app.post("/api/v1/cart/bundles", user, body.clone()).await;
    let (status, _) = app.post("/api/v1/cart/bundles", user, body).await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_read_reprices_after_discount_starts() {
    let app = TestApp::new();
    let game = app.seed_product("Starfall", 4000).await;
    let user = Some(Uuid::now_v7());
    app.post("/api/v1/cart/items", user, json!({ "product_id": game.id }))
        .await;

    app.seed_discount(game.id, 25).await;
    let (status, json) = app.get("/api/v1/cart", user).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&json["items"][0]["price"]), cents(3000));
    assert_eq!(money(&json["original_total"]), cents(4000));
}

#[tokio::test]
async fn test_remove_missing_bundle_is_not_found() {
    let app = TestApp::new();
    let game = app.seed_product("Starfall", 4000).await;
    let user = Some(Uuid::now_v7());
    app.post("/api/v1/cart/items", user, json!({ "product_id": game.id }))
        .await;

    let (status, _) = app
        .delete(&format!("/api/v1/cart/bundles/{}", Uuid::now_v7()), user)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_cart() {
    let app = TestApp::new();
    let game = app.seed_product("Starfall", 4000).await;
    let user = Some(Uuid::now_v7());
    app.post("/api/v1/cart/items", user, json!({ "product_id": game.id }))
        .await;

    let (status, json) = app.delete("/api/v1/cart", user).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["items"].as_array().unwrap().is_empty());
    assert_eq!(money(&json["total"]), cents(0));
}
