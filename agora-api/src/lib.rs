//! # Agora API Server
//!
//! REST API for cached translation with per-client rate limiting.
//!
//! ## Endpoints
//!
//! - `POST /api/v1/translate` - Translate one text
//! - `POST /api/v1/translate/batch` - Translate up to 50 texts
//! - `GET /api/v1/translate/languages` - Supported languages
//! - `GET /api/v1/cache/stats` - Cache statistics
//! - `GET /api/v1/cache/popular` - Most-hit entries
//! - `POST /api/v1/cache/cleanup` - Purge expired entries
//! - `POST /api/v1/cache/limit` - Trim to a maximum size
//! - `DELETE /api/v1/cache` - Clear the cache
//! - `DELETE /api/v1/cache/:hash` - Remove one entry
//!
//! Every `/api` response carries `X-RateLimit-Limit`,
//! `X-RateLimit-Remaining` and `X-RateLimit-Reset`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use agora_api::{ApiServer, ApiConfig};
//!
//! let server = ApiServer::new(ApiConfig::from_env())?;
//! server.run(([0, 0, 0, 0], 3000)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod extract;
mod handlers;
mod middleware;
mod routes;
mod state;

pub use error::ApiError;
pub use middleware::client_id;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use agora_cache::TranslationCache;
use agora_core::constants::RATE_LIMIT_SWEEP_INTERVAL_SECONDS;
use agora_core::error::Result;

/// API server for Agora.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self::with_state(AppState::new(config)?))
    }

    /// Creates a server around prepared state.
    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Returns the shared state.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Starts the rate-limit sweeper and the cache cleanup task.
    pub fn spawn_background_tasks(&self) -> Vec<JoinHandle<()>> {
        let mut tasks = vec![self
            .state
            .limiter
            .spawn_sweeper(Duration::from_secs(RATE_LIMIT_SWEEP_INTERVAL_SECONDS))];

        if let Some(cache) = self.state.cache() {
            let every = Duration::from_secs(self.state.config.cache_cleanup_interval_seconds.max(1));
            tasks.push(spawn_cache_cleanup(Arc::downgrade(cache), every));
        }

        tasks
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let tasks = self.spawn_background_tasks();

        info!("Agora API server listening on {}", addr);

        let result = axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await;

        for task in tasks {
            task.abort();
        }
        result
    }
}

/// Purges expired entries every `every`; stops once the cache is dropped.
fn spawn_cache_cleanup(cache: std::sync::Weak<TranslationCache>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(cache) = cache.upgrade() else {
                break;
            };
            let removed = cache.cleanup_expired();
            debug!(removed, remaining = cache.len(), "Periodic cache cleanup");
        }
    })
}

/// Starts the API server with configuration from the environment.
pub async fn start_server(port: u16) -> Result<()> {
    let server = ApiServer::new(ApiConfig::from_env())?;
    server.run(([0, 0, 0, 0], port)).await?;
    Ok(())
}
