use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Cart, CartItem},
};

use super::{bearer_user, AppState};

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub content_id: Uuid,
    /// Defaults to one copy
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub total_cents: i64,
    pub count: u64,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items.clone(),
            total_cents: cart.total_cents(),
            count: cart.count(),
        }
    }
}

/// Returns the user's cart with its running totals
pub async fn get_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<CartResponse>> {
    let user = bearer_user(&state, &headers).await?;
    let response = state
        .with_session(user, |session| CartResponse::from(&session.cart))
        .await;
    Ok(Json(response))
}

/// Adds a catalog item to the cart, snapshotting its current price
pub async fn add_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AddItemRequest>,
) -> AppResult<Json<CartResponse>> {
    let user = bearer_user(&state, &headers).await?;

    let content = state
        .store
        .get_content(request.content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", request.content_id)))?;

    let response = state
        .with_session(user, |session| {
            session.cart.add_item(&content, request.quantity.unwrap_or(1));
            CartResponse::from(&session.cart)
        })
        .await;

    Ok(Json(response))
}

/// Sets an item's quantity; zero or less removes the item
pub async fn update_quantity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(content_id): Path<Uuid>,
    Json(request): Json<UpdateQuantityRequest>,
) -> AppResult<Json<CartResponse>> {
    let user = bearer_user(&state, &headers).await?;

    let response = state
        .with_session(user, |session| {
            if session.cart.update_quantity(content_id, request.quantity) {
                Ok(CartResponse::from(&session.cart))
            } else {
                Err(AppError::NotFound(format!(
                    "Content {} is not in the cart",
                    content_id
                )))
            }
        })
        .await?;

    Ok(Json(response))
}

/// Empties the cart
pub async fn clear_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<CartResponse>> {
    let user = bearer_user(&state, &headers).await?;

    let response = state
        .with_session(user, |session| {
            session.cart.clear();
            CartResponse::from(&session.cart)
        })
        .await;

    Ok(Json(response))
}

/// Removes an item from the cart
pub async fn remove_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(content_id): Path<Uuid>,
) -> AppResult<Json<CartResponse>> {
    let user = bearer_user(&state, &headers).await?;

    let response = state
        .with_session(user, |session| {
            if session.cart.remove_item(content_id) {
                Ok(CartResponse::from(&session.cart))
            } else {
                Err(AppError::NotFound(format!(
                    "Content {} is not in the cart",
                    content_id
                )))
            }
        })
        .await?;

    Ok(Json(response))
}
