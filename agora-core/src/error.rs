//! Error types for Agora.
//!
//! One error hierarchy built with `thiserror`, shared by the cache, rate
//! limiter, translator clients, and API layer.

use thiserror::Error;

/// Result type alias using `AgoraError`.
pub type Result<T> = std::result::Result<T, AgoraError>;

/// Main error type for all Agora operations.
#[derive(Debug, Error)]
pub enum AgoraError {
    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Text to translate is empty or whitespace only.
    #[error("Text to translate cannot be empty")]
    EmptyText,

    /// Text exceeds the provider's request size.
    #[error("Text too long: maximum {max} bytes, got {actual}")]
    TextTooLong {
        /// Maximum accepted size in bytes
        max: usize,
        /// Size of the rejected text in bytes
        actual: usize,
    },

    /// Language code is not in the supported set.
    #[error("Unsupported language: '{0}'")]
    UnsupportedLanguage(String),

    /// Language code cannot be used as a translation target.
    #[error("Invalid target language: '{0}'")]
    InvalidTargetLanguage(String),

    /// Content hash has the wrong length or is not hex.
    #[error("Invalid content hash: {0}")]
    InvalidContentHash(String),

    /// Generic input validation failure.
    #[error("Validation error: {0}")]
    ValidationError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // PROVIDER ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Provider rejected or failed the translation.
    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    /// Provider is overloaded or temporarily down.
    #[error("Translation provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Provider did not answer in time.
    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // RATE LIMIT & CACHE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Client exceeded its request quota.
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until the next request is accepted
        retry_after_secs: u64,
    },

    /// No cache entry for the given hash.
    #[error("Cache entry not found: {0}")]
    CacheEntryNotFound(String),

    /// Cache is disabled in the current configuration.
    #[error("Translation cache is disabled")]
    CacheDisabled,

    // ═══════════════════════════════════════════════════════════════════════════
    // CONVERSION & I/O ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION & INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal invariant violation.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AgoraError {
    /// Returns true if the operation may succeed when retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AgoraError::HttpError(_)
                | AgoraError::ConnectionTimeout(_)
                | AgoraError::ProviderUnavailable(_)
                | AgoraError::RateLimited { .. }
        )
    }

    /// Returns true if this error was caused by bad caller input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AgoraError::EmptyText
                | AgoraError::TextTooLong { .. }
                | AgoraError::UnsupportedLanguage(_)
                | AgoraError::InvalidTargetLanguage(_)
                | AgoraError::InvalidContentHash(_)
                | AgoraError::ValidationError(_)
                | AgoraError::HexError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgoraError::TextTooLong {
            max: 10_000,
            actual: 12_345,
        };
        assert!(err.to_string().contains("10000"));
        assert!(err.to_string().contains("12345"));

        let err = AgoraError::RateLimited { retry_after_secs: 42 };
        assert_eq!(err.to_string(), "Rate limit exceeded, retry after 42s");
    }

    #[test]
    fn test_error_classification() {
        assert!(AgoraError::HttpError("reset".into()).is_recoverable());
        assert!(AgoraError::ProviderUnavailable("503".into()).is_recoverable());
        assert!(!AgoraError::EmptyText.is_recoverable());

        assert!(AgoraError::EmptyText.is_validation_error());
        assert!(AgoraError::UnsupportedLanguage("xx".into()).is_validation_error());
        assert!(!AgoraError::TranslationFailed("boom".into()).is_validation_error());
    }

    #[test]
    fn test_hex_error_conversion() {
        let result: Result<Vec<u8>> = hex::decode("zz").map_err(AgoraError::from);
        assert!(matches!(result, Err(AgoraError::HexError(_))));
    }
}
