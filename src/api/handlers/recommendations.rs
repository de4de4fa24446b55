use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::{error::AppResult, models::RecommendedContent};

use super::{bearer_user, AppState};

const DEFAULT_COUNT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub count: Option<usize>,
}

/// Returns blended recommendations for the authenticated user
pub async fn recommend(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<Vec<RecommendedContent>>> {
    let user = bearer_user(&state, &headers).await?;
    let count = params.count.unwrap_or(DEFAULT_COUNT);
    let recommendations = state.recommendations.recommend(user, count).await;
    Ok(Json(recommendations))
}
