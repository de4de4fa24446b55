use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    cache::CacheKey,
    cached,
    error::{AppError, AppResult},
    models::Content,
};

use super::AppState;

/// Lists the whole catalog, served from the TTL cache when warm
pub async fn list_content(State(state): State<AppState>) -> AppResult<Json<Vec<Content>>> {
    let catalog = load_catalog(&state).await?;
    Ok(Json(catalog))
}

/// Read-through catalog load; the return type pins the cached value type
async fn load_catalog(state: &AppState) -> AppResult<Vec<Content>> {
    cached!(state.cache, CacheKey::Catalog, None, async {
        state.store.list_content().await
    })
}

/// Fetches a single catalog item
pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Content>> {
    let key = CacheKey::Content(id);
    if let Some(hit) = state.cache.get::<Content>(&key).await? {
        return Ok(Json(hit));
    }

    let content = state
        .store
        .get_content(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", id)))?;

    state.cache.set(&key, &content, None).await?;
    Ok(Json(content))
}
