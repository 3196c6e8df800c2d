//! Catalog Handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::response::{BundleResponse, ProductResponse};
use crate::presentation::http::extractors::parse_id;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Get a product with its current price
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductResponse>, AppError> {
    let product_id = parse_id(&product_id, "product")?;

    let product = state.catalog.get_product(product_id).await?;

    Ok(Json(product.into()))
}

/// Get a bundle with its members and shares
pub async fn get_bundle(
    State(state): State<AppState>,
    Path(bundle_id): Path<String>,
) -> Result<Json<BundleResponse>, AppError> {
    let bundle_id = parse_id(&bundle_id, "bundle")?;

    let bundle = state.catalog.get_bundle(bundle_id).await?;

    Ok(Json(bundle.into()))
}
