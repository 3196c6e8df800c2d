//! Cart Handlers
//!
//! Every handler answers with the full, reconciled cart.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::request::{AddBundleRequest, AddProductRequest};
use crate::application::dto::response::CartResponse;
use crate::presentation::http::extractors::{parse_id, AuthUser};
use crate::shared::error::AppError;
use crate::shared::validation::validate_request;
use crate::startup::AppState;

/// Get the current user's cart
pub async fn get_cart(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CartResponse>, AppError> {
    let cart = state.carts.get_active_cart(auth.user_id).await?;
    Ok(Json(cart.into()))
}

/// Remove every line from the cart
pub async fn clear_cart(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CartResponse>, AppError> {
    let cart = state.carts.clear_cart(auth.user_id).await?;
    Ok(Json(cart.into()))
}

/// Add a product
pub async fn add_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<AddProductRequest>,
) -> Result<Json<CartResponse>, AppError> {
    validate_request(&body)?;

    let cart = state
        .carts
        .add_product(auth.user_id, body.product_id)
        .await?;

    Ok(Json(cart.into()))
}

/// Remove a line; bundle lines remove their whole bundle
pub async fn remove_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<String>,
) -> Result<Json<CartResponse>, AppError> {
    let item_id = parse_id(&item_id, "cart item")?;

    let cart = state.carts.remove_item(auth.user_id, item_id).await?;

    Ok(Json(cart.into()))
}

/// Add a bundle
pub async fn add_bundle(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<AddBundleRequest>,
) -> Result<Json<CartResponse>, AppError> {
    validate_request(&body)?;

    let cart = state.carts.add_bundle(auth.user_id, body.bundle_id).await?;

    Ok(Json(cart.into()))
}

/// Remove a bundle
pub async fn remove_bundle(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(bundle_id): Path<String>,
) -> Result<Json<CartResponse>, AppError> {
    let bundle_id = parse_id(&bundle_id, "bundle")?;

    let cart = state.carts.remove_bundle(auth.user_id, bundle_id).await?;

    Ok(Json(cart.into()))
}
