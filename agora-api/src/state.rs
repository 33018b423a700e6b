//! App state: translator, cache, rate limiter, config.

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::warn;

use agora_cache::{CacheConfig, TranslationCache};
use agora_core::constants::*;
use agora_core::error::Result;
use agora_core::traits::Translator;
use agora_ratelimit::{RateLimitPolicy, RateLimiter, RoutePolicies};
use agora_translate::{CachingTranslator, HttpTranslator, HttpTranslatorConfig};

/// Path prefix whose requests use the translation quota.
pub const TRANSLATE_ROUTE_PREFIX: &str = "/api/v1/translate";

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Translation provider
    pub translator: HttpTranslatorConfig,
    /// Whether translations are cached
    pub enable_cache: bool,
    /// Cache size and TTL
    pub cache: CacheConfig,
    /// Seconds between background purges of expired entries
    pub cache_cleanup_interval_seconds: u64,
    /// Default policy for `/api` routes
    pub rate_limit: RateLimitPolicy,
    /// Policy for translation routes
    pub translate_rate_limit: RateLimitPolicy,
    /// Identify clients by the first `X-Forwarded-For` hop
    pub trust_forwarded_for: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let window = Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECONDS);
        Self {
            translator: HttpTranslatorConfig::default(),
            enable_cache: true,
            cache: CacheConfig::default(),
            cache_cleanup_interval_seconds: DEFAULT_CACHE_CLEANUP_INTERVAL_SECONDS,
            rate_limit: RateLimitPolicy::new(DEFAULT_RATE_LIMIT_MAX_REQUESTS, window),
            translate_rate_limit: RateLimitPolicy::new(DEFAULT_TRANSLATE_RATE_LIMIT_MAX_REQUESTS, window),
            trust_forwarded_for: false,
        }
    }
}

impl ApiConfig {
    /// Reads configuration from the environment, loading `.env` first.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from any key/value source.
    ///
    /// Missing keys keep their defaults; unparsable or out-of-range values
    /// and a zero rate-limit window are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off"))
                .unwrap_or(default)
        };

        let mut translator = HttpTranslatorConfig::new(
            lookup("TRANSLATOR_URL").unwrap_or(defaults.translator.endpoint),
        )
        .with_timeout(parse_or(
            &lookup,
            "TRANSLATOR_TIMEOUT_SECONDS",
            defaults.translator.timeout_seconds,
        ));
        if let Some(key) = lookup("TRANSLATOR_API_KEY").filter(|k| !k.trim().is_empty()) {
            translator = translator.with_api_key(key);
        }

        // A zero-length window would never limit anything.
        let default_window = defaults.rate_limit.window.as_secs();
        let window_seconds = match parse_or(&lookup, "RATE_LIMIT_WINDOW_SECONDS", default_window) {
            0 => {
                warn!(key = "RATE_LIMIT_WINDOW_SECONDS", "Ignoring zero rate-limit window");
                default_window
            }
            secs => secs,
        };
        let window = Duration::from_secs(window_seconds);

        Self {
            translator,
            enable_cache: flag("ENABLE_CACHE", defaults.enable_cache),
            cache: CacheConfig {
                max_entries: parse_or(&lookup, "CACHE_MAX_ENTRIES", defaults.cache.max_entries),
                default_ttl_seconds: parse_or(
                    &lookup,
                    "CACHE_TTL_SECONDS",
                    defaults.cache.default_ttl_seconds,
                ),
                auto_cleanup: true,
            },
            cache_cleanup_interval_seconds: parse_or(
                &lookup,
                "CACHE_CLEANUP_INTERVAL_SECONDS",
                defaults.cache_cleanup_interval_seconds,
            ),
            rate_limit: RateLimitPolicy::new(
                parse_or(&lookup, "RATE_LIMIT_MAX", defaults.rate_limit.max_requests),
                window,
            ),
            translate_rate_limit: RateLimitPolicy::new(
                parse_or(
                    &lookup,
                    "TRANSLATE_RATE_LIMIT_MAX",
                    defaults.translate_rate_limit.max_requests,
                ),
                window,
            ),
            trust_forwarded_for: flag("TRUST_FORWARDED_FOR", defaults.trust_forwarded_for),
        }
    }

    /// Rate-limit policies per route prefix.
    pub fn route_policies(&self) -> RoutePolicies {
        RoutePolicies::new(self.rate_limit.clone())
            .with_route(TRANSLATE_ROUTE_PREFIX, self.translate_rate_limit.clone())
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Ignoring invalid configuration value");
            default
        }),
        None => default,
    }
}

/// Shared state for all handlers.
pub struct AppState {
    /// Configuration the state was built from
    pub config: ApiConfig,
    /// Provider behind validation and the cache
    pub translator: CachingTranslator,
    /// Request windows per client and route
    pub limiter: Arc<RateLimiter>,
    /// Policy per route prefix
    pub policies: RoutePolicies,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    /// Creates state with the configured HTTP translation provider.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let provider = HttpTranslator::with_config(config.translator.clone())?;
        Ok(Self::with_translator(config, Arc::new(provider)))
    }

    /// Creates state around an existing provider.
    pub fn with_translator(config: ApiConfig, provider: Arc<dyn Translator>) -> Self {
        let translator = if config.enable_cache {
            let cache = Arc::new(TranslationCache::with_config(config.cache.clone()));
            CachingTranslator::new(provider, cache)
        } else {
            CachingTranslator::uncached(provider)
        };

        Self {
            policies: config.route_policies(),
            config,
            translator,
            limiter: Arc::new(RateLimiter::new()),
            started_at: Instant::now(),
        }
    }

    /// Returns the translation cache, if enabled.
    pub fn cache(&self) -> Option<&Arc<TranslationCache>> {
        self.translator.cache()
    }
}
