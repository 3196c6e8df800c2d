//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .merge(cart_routes())
        .merge(order_routes())
        .route("/library", get(handlers::library::list_library))
}

/// Catalog routes (public)
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/catalog/products/{product_id}",
            get(handlers::catalog::get_product),
        )
        .route(
            "/catalog/bundles/{bundle_id}",
            get(handlers::catalog::get_bundle),
        )
}

/// Cart routes (require X-User-Id)
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cart",
            get(handlers::cart::get_cart).delete(handlers::cart::clear_cart),
        )
        .route("/cart/items", post(handlers::cart::add_product))
        .route("/cart/items/{item_id}", delete(handlers::cart::remove_item))
        .route("/cart/bundles", post(handlers::cart::add_bundle))
        .route(
            "/cart/bundles/{bundle_id}",
            delete(handlers::cart::remove_bundle),
        )
}

/// Order and payment routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(handlers::order::list_orders))
        .route("/orders/checkout", post(handlers::order::checkout))
        .route("/orders/{order_id}", get(handlers::order::get_order))
        // Called by the payment provider, not the user
        .route(
            "/payments/{payment_id}/complete",
            post(handlers::order::complete_payment),
        )
}
