//! DTOs for API requests and responses.

use serde::{Deserialize, Serialize};

use agora_cache::{content_hash, CacheEntryInfo};
use agora_core::error::Result;
use agora_core::types::{LanguageCode, Translation, TranslationRequest};

use crate::error::ErrorBody;

/// Request to translate one text.
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    /// Text to translate
    pub text: String,
    /// Source language; omitted or "auto" for detection
    #[serde(default)]
    pub source: Option<String>,
    /// Target language
    pub target: String,
}

impl TranslateRequest {
    /// Parses languages into a domain request.
    pub fn into_domain(self) -> Result<TranslationRequest> {
        let source = match self.source.as_deref().map(str::trim) {
            None | Some("") => LanguageCode::auto(),
            Some(code) => LanguageCode::parse(code)?,
        };
        let target = LanguageCode::parse(&self.target)?;
        Ok(TranslationRequest::new(self.text, source, target))
    }
}

/// Response for a translation.
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    /// Translated text
    pub translated_text: String,
    /// Source language as requested
    pub source: String,
    /// Target language
    pub target: String,
    /// Language detected by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_source: Option<String>,
    /// Whether the answer came from the cache
    pub cached: bool,
    /// Translator that produced the text
    pub provider: String,
    /// Cache key of this translation (hex)
    pub content_hash: String,
}

impl TranslateResponse {
    /// Builds the response for a completed request.
    pub fn new(request: &TranslationRequest, translation: Translation) -> Self {
        Self {
            content_hash: content_hash(&request.text, &request.source, &request.target).to_hex(),
            translated_text: translation.text,
            source: translation.source.to_string(),
            target: translation.target.to_string(),
            detected_source: translation.detected_source,
            cached: translation.cached,
            provider: translation.provider,
        }
    }
}

/// Request to translate several texts.
#[derive(Debug, Deserialize)]
pub struct BatchTranslateRequest {
    /// Up to `MAX_BATCH_SIZE` items
    pub items: Vec<TranslateRequest>,
}

/// Outcome of one batch item; exactly one field is set.
#[derive(Debug, Serialize)]
pub struct BatchItemResult {
    /// Set on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<TranslateResponse>,
    /// Set on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Response for a batch translation.
#[derive(Debug, Serialize)]
pub struct BatchTranslateResponse {
    /// Results in request order
    pub results: Vec<BatchItemResult>,
    /// Items translated successfully
    pub succeeded: usize,
    /// Items that failed
    pub failed: usize,
}

/// Supported languages.
#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    /// Accepted language codes
    pub languages: Vec<&'static str>,
    /// Whether "auto" is accepted as a source
    pub auto_detect: bool,
}

/// Query parameters for the popular listing.
#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    /// Maximum entries to return
    pub limit: Option<usize>,
}

/// Most-hit cache entries.
#[derive(Debug, Serialize)]
pub struct PopularResponse {
    /// Entries, most hit first
    pub entries: Vec<CacheEntryInfo>,
    /// Number of entries returned
    pub total: usize,
}

/// Result of purging expired entries.
#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    /// Entries removed
    pub removed: usize,
    /// Entries left
    pub remaining: usize,
}

/// Request to trim the cache.
#[derive(Debug, Deserialize)]
pub struct EnforceLimitRequest {
    /// Entries to keep at most
    pub max_entries: usize,
}

/// Result of trimming the cache.
#[derive(Debug, Serialize)]
pub struct EnforceLimitResponse {
    /// Entries evicted
    pub evicted: usize,
    /// Entries left
    pub remaining: usize,
}

/// Result of clearing the cache.
#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    /// Entries removed
    pub cleared: usize,
}

/// Result of deleting one entry.
#[derive(Debug, Serialize)]
pub struct RemoveEntryResponse {
    /// Deleted content hash
    pub hash: String,
    /// Whether an entry was removed
    pub removed: bool,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Version
    pub version: String,
    /// Seconds since startup
    pub uptime_seconds: u64,
    /// Translation provider name
    pub provider: String,
    /// Whether the translation cache is on
    pub cache_enabled: bool,
    /// Entries in the cache
    pub cache_entries: usize,
    /// Tracked rate-limit windows
    pub rate_limit_windows: usize,
}
