//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::Uri,
    Json,
};
use tracing::{debug, info};

use agora_cache::{CacheStats, ContentHash, TranslationCache};
use agora_core::constants::MAX_BATCH_SIZE;
use agora_core::error::AgoraError;
use agora_core::traits::Translator;
use agora_core::types::SUPPORTED_LANGUAGES;

use crate::dto::*;
use crate::error::{ApiError, ErrorBody};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

const DEFAULT_POPULAR_LIMIT: usize = 10;
const MAX_POPULAR_LIMIT: usize = 100;

fn require_cache(state: &AppState) -> Result<&Arc<TranslationCache>> {
    state.cache().ok_or_else(|| AgoraError::CacheDisabled.into())
}

/// POST /api/v1/translate
pub async fn translate(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<TranslateRequest>,
) -> Result<Json<TranslateResponse>> {
    let request = req.into_domain()?;
    let translation = state.translator.translate(&request).await?;

    debug!(
        source = %request.source,
        target = %request.target,
        cached = translation.cached,
        "Translated text"
    );

    Ok(Json(TranslateResponse::new(&request, translation)))
}

/// POST /api/v1/translate/batch
pub async fn translate_batch(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<BatchTranslateRequest>,
) -> Result<Json<BatchTranslateResponse>> {
    if req.items.is_empty() {
        return Err(ApiError::validation("Batch must contain at least one item"));
    }
    if req.items.len() > MAX_BATCH_SIZE {
        return Err(ApiError::validation(format!(
            "Batch size {} exceeds maximum of {}",
            req.items.len(),
            MAX_BATCH_SIZE
        )));
    }

    // Items with unparsable languages fail individually.
    let parsed: Vec<_> = req.items.into_iter().map(TranslateRequest::into_domain).collect();
    let requests: Vec<_> = parsed.iter().filter_map(|p| p.as_ref().ok()).cloned().collect();
    let mut translated = state.translator.translate_batch(&requests).await.into_iter();
    let mut valid = requests.iter();

    let results: Vec<BatchItemResult> = parsed
        .into_iter()
        .map(|item| {
            let outcome = item.and_then(|_| {
                let request = valid.next();
                let result = translated.next();
                match (request, result) {
                    (Some(request), Some(result)) => {
                        result.map(|t| TranslateResponse::new(request, t))
                    }
                    _ => Err(AgoraError::InternalError("batch result missing".into())),
                }
            });
            match outcome {
                Ok(translation) => BatchItemResult {
                    translation: Some(translation),
                    error: None,
                },
                Err(err) => BatchItemResult {
                    translation: None,
                    error: Some(ErrorBody::from(&ApiError::from(err))),
                },
            }
        })
        .collect();

    let succeeded = results.iter().filter(|r| r.translation.is_some()).count();
    let failed = results.len() - succeeded;
    info!(total = results.len(), succeeded, failed, "Translated batch");

    Ok(Json(BatchTranslateResponse {
        results,
        succeeded,
        failed,
    }))
}

/// GET /api/v1/translate/languages
pub async fn list_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: SUPPORTED_LANGUAGES.to_vec(),
        auto_detect: true,
    })
}

/// GET /api/v1/cache/stats
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Result<Json<CacheStats>> {
    Ok(Json(require_cache(&state)?.stats()))
}

/// GET /api/v1/cache/popular
pub async fn popular_translations(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PopularQuery>,
) -> Result<Json<PopularResponse>> {
    let cache = require_cache(&state)?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_POPULAR_LIMIT)
        .clamp(1, MAX_POPULAR_LIMIT);

    let entries = cache.popular(limit);
    Ok(Json(PopularResponse {
        total: entries.len(),
        entries,
    }))
}

/// POST /api/v1/cache/cleanup
pub async fn cleanup_cache(State(state): State<Arc<AppState>>) -> Result<Json<CleanupResponse>> {
    let cache = require_cache(&state)?;
    let removed = cache.cleanup_expired();

    Ok(Json(CleanupResponse {
        removed,
        remaining: cache.len(),
    }))
}

/// POST /api/v1/cache/limit
pub async fn enforce_cache_limit(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<EnforceLimitRequest>,
) -> Result<Json<EnforceLimitResponse>> {
    let cache = require_cache(&state)?;
    let evicted = cache.enforce_size_limit(req.max_entries);

    info!(max_entries = req.max_entries, evicted, "Trimmed translation cache");

    Ok(Json(EnforceLimitResponse {
        evicted,
        remaining: cache.len(),
    }))
}

/// DELETE /api/v1/cache
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Result<Json<ClearCacheResponse>> {
    let cache = require_cache(&state)?;
    let cleared = cache.len();
    cache.clear();

    info!(cleared, "Cleared translation cache");
    Ok(Json(ClearCacheResponse { cleared }))
}

/// DELETE /api/v1/cache/:hash
pub async fn remove_cache_entry(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<RemoveEntryResponse>> {
    let cache = require_cache(&state)?;
    let hash = ContentHash::from_hex(&hash)?;

    if !cache.remove(&hash) {
        return Err(AgoraError::CacheEntryNotFound(hash.to_hex()).into());
    }

    debug!(%hash, "Removed cache entry");
    Ok(Json(RemoveEntryResponse {
        hash: hash.to_hex(),
        removed: true,
    }))
}

/// Unmatched `/api` routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        provider: state.translator.name().to_string(),
        cache_enabled: state.cache().is_some(),
        cache_entries: state.cache().map_or(0, |c| c.len()),
        rate_limit_windows: state.limiter.len(),
    })
}
