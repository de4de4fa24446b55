use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::OfflineBook,
};

use super::AppState;

/// Lists tracked offline downloads
pub async fn list_offline(State(state): State<AppState>) -> Json<Vec<OfflineBook>> {
    Json(state.offline.list().await)
}

/// Starts a simulated download for a catalog item
///
/// Returns 202: progress continues in the background and the record can be
/// polled through the list endpoint.
pub async fn start_download(
    State(state): State<AppState>,
    Path(content_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<OfflineBook>)> {
    let content = state
        .store
        .get_content(content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", content_id)))?;

    let record = state.offline.start_download(&content).await;
    Ok((StatusCode::ACCEPTED, Json(record)))
}

/// Drops one tracked download
pub async fn remove_offline(
    State(state): State<AppState>,
    Path(content_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.offline.remove(content_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "Content {} is not tracked offline",
            content_id
        )))
    }
}

/// Forgets every tracked download
pub async fn clear_offline(State(state): State<AppState>) -> StatusCode {
    state.offline.clear_all().await;
    StatusCode::NO_CONTENT
}
