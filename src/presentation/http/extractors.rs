//! Custom Extractors
//!
//! Axum extractors for request identity and path parsing.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Header carrying the user id authenticated by the identity provider in
/// front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user taken from the `X-User-Id` header
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Missing X-User-Id header".into()))?;

        let user_id = value
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .filter(|id| !id.is_nil())
            .ok_or_else(|| AppError::Unauthorized("Invalid X-User-Id header".into()))?;

        Ok(AuthUser { user_id })
    }
}

/// Parse a path segment as an id, naming the resource in the error.
pub fn parse_id(raw: &str, resource: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} ID", resource)))
}
