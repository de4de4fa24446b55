use axum::http::{header, HeaderMap};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::AppState;

pub mod cart;
pub mod catalog;
pub mod offline;
pub mod profile;
pub mod purchase;
pub mod recommendations;

/// Resolves the request's bearer token to a user id
///
/// Token issuance belongs to the auth backend; this only checks the presented
/// token against stored sessions and maps every failure to 401.
pub(crate) async fn bearer_user(state: &AppState, headers: &HeaderMap) -> AppResult<Uuid> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    state
        .store
        .user_for_token(token.to_string())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid bearer token".to_string()))
}
