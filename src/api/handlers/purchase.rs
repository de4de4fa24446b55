use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::Purchase,
};

use super::{bearer_user, AppState};

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequest {
    pub content_id: Uuid,
}

/// Creates a purchase for the authenticated user
///
/// Validates the bearer token (401), looks up the item's price (404 for an
/// unknown item), then records the purchase and the library entry. Payment
/// processing is deliberately absent; the row is the receipt.
pub async fn create_purchase(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(request): Json<CreatePurchaseRequest>,
) -> AppResult<(StatusCode, Json<Purchase>)> {
    let user = bearer_user(&state, &headers).await?;

    let content = state
        .store
        .get_content(request.content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", request.content_id)))?;

    let purchase = state
        .store
        .insert_purchase(user, content.id, content.price_cents)
        .await?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user,
        content_id = %content.id,
        amount_cents = purchase.amount_cents,
        "Purchase created"
    );

    Ok((StatusCode::CREATED, Json(purchase)))
}
