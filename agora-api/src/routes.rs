//! API route configuration.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::handlers;
use crate::middleware::rate_limit;
use crate::state::AppState;

/// Creates the API router with all routes configured.
///
/// Everything under `/api` is rate limited, unknown routes included;
/// `/health` is not. Unknown routes get a JSON 404.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Translation
        .route("/api/v1/translate", post(handlers::translate))
        .route("/api/v1/translate/batch", post(handlers::translate_batch))
        .route("/api/v1/translate/languages", get(handlers::list_languages))

        // Cache administration
        .route("/api/v1/cache", delete(handlers::clear_cache))
        .route("/api/v1/cache/stats", get(handlers::cache_stats))
        .route("/api/v1/cache/popular", get(handlers::popular_translations))
        .route("/api/v1/cache/cleanup", post(handlers::cleanup_cache))
        .route("/api/v1/cache/limit", post(handlers::enforce_cache_limit))
        .route("/api/v1/cache/:hash", delete(handlers::remove_cache_entry))

        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(api)
        .with_state(state)
}
