//! Order and Payment Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::CompletePaymentRequest;
use crate::application::dto::response::{CheckoutResponse, OrderResponse};
use crate::application::services::PaymentOutcome;
use crate::presentation::http::extractors::{parse_id, AuthUser};
use crate::shared::error::AppError;
use crate::shared::validation::validate_request;
use crate::startup::AppState;

/// Check out the current cart
pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<(StatusCode, Json<CheckoutResponse>), AppError> {
    let checkout = state.orders.checkout(auth.user_id).await?;
    Ok((StatusCode::CREATED, Json(checkout.into())))
}

/// List the current user's orders
pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = state.orders.list_orders(auth.user_id).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// Get one of the current user's orders
pub async fn get_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order_id = parse_id(&order_id, "order")?;

    let order = state.orders.get_order(auth.user_id, order_id).await?;

    Ok(Json(order.into()))
}

/// Payment provider callback
pub async fn complete_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
    Json(body): Json<CompletePaymentRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let payment_id = parse_id(&payment_id, "payment")?;
    validate_request(&body)?;

    let outcome = PaymentOutcome {
        succeeded: body.succeeded,
        provider_reference: body.provider_reference,
    };
    let order = state.orders.complete_payment(payment_id, outcome).await?;

    Ok(Json(order.into()))
}
