use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::{handlers, AppState};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/content", get(handlers::catalog::list_content))
        .route("/content/:id", get(handlers::catalog::get_content))
        // Recommendations
        .route("/recommendations", get(handlers::recommendations::recommend))
        // Purchases & library
        .route("/purchases", post(handlers::purchase::create_purchase))
        .route("/library", get(handlers::profile::get_library))
        // Cart
        .route("/cart", get(handlers::cart::get_cart))
        .route("/cart", delete(handlers::cart::clear_cart))
        .route("/cart/items", post(handlers::cart::add_item))
        .route("/cart/items/:content_id", put(handlers::cart::update_quantity))
        .route("/cart/items/:content_id", delete(handlers::cart::remove_item))
        // Bookmarks & reading
        .route("/bookmarks", get(handlers::profile::list_bookmarks))
        .route("/bookmarks", post(handlers::profile::create_bookmark))
        .route("/bookmarks/:id", delete(handlers::profile::delete_bookmark))
        .route("/reading-settings", get(handlers::profile::get_reading_settings))
        .route("/reading-settings", put(handlers::profile::put_reading_settings))
        .route("/reading-progress", post(handlers::profile::record_reading_progress))
        // Gift cards
        .route("/gift-cards/redeem", post(handlers::profile::redeem_gift_card))
        // Offline downloads
        .route("/offline", get(handlers::offline::list_offline))
        .route("/offline", delete(handlers::offline::clear_offline))
        .route("/offline/:content_id", post(handlers::offline::start_download))
        .route("/offline/:content_id", delete(handlers::offline::remove_offline))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
