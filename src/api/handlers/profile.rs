use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Bookmark, Content, GiftCard, ReadingSettings},
};

use super::{bearer_user, AppState};

/// Content the user owns, most recently acquired first
pub async fn get_library(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Content>>> {
    let user = bearer_user(&state, &headers).await?;
    let library = state.store.user_library(user).await?;
    Ok(Json(library))
}

pub async fn list_bookmarks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Bookmark>>> {
    let user = bearer_user(&state, &headers).await?;
    let bookmarks = state.store.bookmarks(user).await?;
    Ok(Json(bookmarks))
}

#[derive(Debug, Deserialize)]
pub struct CreateBookmarkRequest {
    pub content_id: Uuid,
    pub position: i64,
    pub note: Option<String>,
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateBookmarkRequest>,
) -> AppResult<(StatusCode, Json<Bookmark>)> {
    let user = bearer_user(&state, &headers).await?;

    if state.store.get_content(request.content_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Content {} not found",
            request.content_id
        )));
    }

    let bookmark = state
        .store
        .insert_bookmark(user, request.content_id, request.position, request.note)
        .await?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

pub async fn delete_bookmark(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(bookmark_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let user = bearer_user(&state, &headers).await?;
    if state.store.delete_bookmark(user, bookmark_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "Bookmark {} not found",
            bookmark_id
        )))
    }
}

/// Current reader preferences, defaults until the user changes them
pub async fn get_reading_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<ReadingSettings>> {
    let user = bearer_user(&state, &headers).await?;
    let settings = state
        .with_session(user, |session| session.reading_settings.clone())
        .await;
    Ok(Json(settings))
}

pub async fn put_reading_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(settings): Json<ReadingSettings>,
) -> AppResult<Json<ReadingSettings>> {
    let user = bearer_user(&state, &headers).await?;
    let stored = state
        .with_session(user, |session| {
            session.reading_settings = settings;
            session.reading_settings.clone()
        })
        .await;
    Ok(Json(stored))
}

#[derive(Debug, Deserialize)]
pub struct ReadingProgressRequest {
    pub content_id: Uuid,
    pub seconds_read: i64,
    pub last_position: i64,
}

/// Accumulates reading time against the user's statistics row
pub async fn record_reading_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ReadingProgressRequest>,
) -> AppResult<StatusCode> {
    let user = bearer_user(&state, &headers).await?;
    if request.seconds_read < 0 {
        return Err(AppError::InvalidInput(
            "seconds_read must be non-negative".to_string(),
        ));
    }
    state
        .store
        .record_reading(user, request.content_id, request.seconds_read, request.last_position)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct RedeemGiftCardRequest {
    pub code: String,
}

/// Redeems a gift card code for the authenticated user
pub async fn redeem_gift_card(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RedeemGiftCardRequest>,
) -> AppResult<Json<GiftCard>> {
    let user = bearer_user(&state, &headers).await?;
    let card = state
        .store
        .redeem_gift_card(request.code, user)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Gift card code is unknown or already redeemed".to_string())
        })?;

    tracing::info!(user_id = %user, card_id = %card.id, amount_cents = card.amount_cents, "Gift card redeemed");

    Ok(Json(card))
}
