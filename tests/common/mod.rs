//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use std::str::FromStr;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use game_store::config::CorsSettings;
use game_store::domain::{
    Bundle, BundleItem, BundleRepository, Discount, DiscountRepository, Product, ProductKind,
    ProductRepository,
};
use game_store::infrastructure::memory::MemoryRepositories;
use game_store::presentation::http::extractors::USER_ID_HEADER;
use game_store::startup::{build_router, AppState};

/// Test application over in-memory storage
pub struct TestApp {
    pub router: Router,
    pub repos: MemoryRepositories,
}

impl TestApp {
    /// Create a new test application with empty storage
    pub fn new() -> Self {
        let repos = MemoryRepositories::default();
        let state = AppState::in_memory(repos.clone());
        let router = build_router(
            state,
            &CorsSettings {
                allowed_origins: vec!["http://localhost:3000".into()],
            },
        );

        Self { router, repos }
    }

    /// Send a request and decode the JSON body (`Value::Null` when empty)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str, user: Option<Uuid>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, user, None).await
    }

    /// Make a GET request and return the raw body text
    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, uri: &str, user: Option<Uuid>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, user, Some(body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, uri: &str, user: Option<Uuid>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, user, None).await
    }

    pub async fn seed_product(&self, name: &str, cents: i64) -> Product {
        let now = Utc::now();
        self.repos
            .products
            .create(&Product {
                id: Uuid::now_v7(),
                name: name.into(),
                kind: ProductKind::Game,
                base_price: Decimal::new(cents, 2),
                base_game_id: None,
                is_deleted: false,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }

    pub async fn seed_discount(&self, product_id: Uuid, percent: i64) -> Discount {
        self.repos
            .discounts
            .create(&Discount {
                id: Uuid::now_v7(),
                product_id,
                percent: Decimal::from(percent),
                starts_at: Utc::now() - Duration::hours(1),
                ends_at: Some(Utc::now() + Duration::days(7)),
                is_deleted: false,
            })
            .await
            .unwrap()
    }

    /// Seed a bundle with explicit shares, given in cents per member
    pub async fn seed_bundle(&self, name: &str, cents: i64, shares: &[(Uuid, i64)]) -> Bundle {
        let id = Uuid::now_v7();
        let now = Utc::now();
        self.repos
            .bundles
            .create(&Bundle {
                id,
                name: name.into(),
                price: Decimal::new(cents, 2),
                is_deleted: false,
                items: shares
                    .iter()
                    .map(|(product_id, share)| BundleItem {
                        bundle_id: id,
                        product_id: *product_id,
                        distributed_price: Decimal::new(*share, 2),
                    })
                    .collect(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }
}

/// Read a money field serialized as a decimal string
pub fn money(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("money is serialized as a string"))
        .expect("money is a valid decimal")
}

/// Money from cents, for comparisons
pub fn cents(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}
