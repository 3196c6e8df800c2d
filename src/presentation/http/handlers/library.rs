//! Library Handlers

use axum::{extract::State, Json};

use crate::application::dto::response::LibraryEntryResponse;
use crate::presentation::http::extractors::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// List the current user's owned products
pub async fn list_library(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<LibraryEntryResponse>>, AppError> {
    let entries = state.library.list_library(auth.user_id).await?;
    Ok(Json(entries.into_iter().map(LibraryEntryResponse::from).collect()))
}
