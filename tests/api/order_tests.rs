//! Order and Payment API Tests

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::{cents, money, TestApp};

async fn checkout_one(app: &TestApp, user: Option<Uuid>, price_cents: i64) -> serde_json::Value {
    let game = app.seed_product("Starfall", price_cents).await;
    app.post("/api/v1/cart/items", user, json!({ "product_id": game.id }))
        .await;
    let (status, json) = app.post("/api/v1/orders/checkout", user, json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    json
}

#[tokio::test]
async fn test_checkout_empty_cart_is_bad_request() {
    let app = TestApp::new();

    let (status, _) = app
        .post("/api/v1/orders/checkout", Some(Uuid::now_v7()), json!({}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_then_pay_grants_library_entry() {
    let app = TestApp::new();
    let user = Some(Uuid::now_v7());
    let checkout = checkout_one(&app, user, 2500).await;

    assert_eq!(checkout["order"]["status"], "pending");
    assert_eq!(money(&checkout["order"]["total"]), cents(2500));
    assert_eq!(checkout["payment"]["status"], "pending");

    let payment_id = checkout["payment"]["id"].as_str().unwrap();
    let (status, order) = app
        .post(
            &format!("/api/v1/payments/{}/complete", payment_id),
            None,
            json!({ "succeeded": true, "provider_reference": "psp-42" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "paid");

    let (status, library) = app.get("/api/v1/library", user).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(library.as_array().unwrap().len(), 1);
    assert_eq!(library[0]["name"], "Starfall");

    let (_, cart) = app.get("/api/v1/cart", user).await;
    assert!(cart["id"].is_null());
}

#[tokio::test]
async fn test_failed_payment_cancels_and_cannot_be_retried() {
    let app = TestApp::new();
    let user = Some(Uuid::now_v7());
    let checkout = checkout_one(&app, user, 2500).await;
    let uri = format!(
        "/api/v1/payments/{}/complete",
        checkout["payment"]["id"].as_str().unwrap()
    );

    let (status, order) = app
        .post(&uri, None, json!({ "succeeded": false }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "cancelled");

    let (status, _) = app.post(&uri, None, json!({ "succeeded": true })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_orders_are_listed_per_user() {
    let app = TestApp::new();
    let user = Some(Uuid::now_v7());
    let checkout = checkout_one(&app, user, 1000).await;
    let order_id = checkout["order"]["id"].as_str().unwrap();

    let (status, orders) = app.get("/api/v1/orders", user).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let (status, _) = app
        .get(&format!("/api/v1/orders/{}", order_id), user)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .get(&format!("/api/v1/orders/{}", order_id), Some(Uuid::now_v7()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_of_product_owned_meanwhile_conflicts() {
    let app = TestApp::new();
    let user = Some(Uuid::now_v7());
    let game = app.seed_product("Starfall", 2500).await;
    let body = json!({ "product_id": game.id });
    app.post("/api/v1/cart/items", user, body.clone()).await;
    let (_, first) = app.post("/api/v1/orders/checkout", user, json!({})).await;
    let (status, _) = app.post("/api/v1/cart/items", user, body).await;
    assert_eq!(status, StatusCode::OK);

    let payment_id = first["payment"]["id"].as_str().unwrap();
    app.post(
        &format!("/api/v1/payments/{}/complete", payment_id),
        None,
        json!({ "succeeded": true }),
    )
    .await;
    let (status, json) = app.post("/api/v1/orders/checkout", user, json!({})).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], 10005);
}
