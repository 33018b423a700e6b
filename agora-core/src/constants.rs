//! Service-wide constants and defaults.

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSLATION LIMITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum size of a single text submitted for translation, in bytes.
/// Matches the per-request limit of the upstream translation service.
pub const MAX_TRANSLATION_TEXT_BYTES: usize = 10_000;

/// Maximum number of texts accepted by one batch request.
pub const MAX_BATCH_SIZE: usize = 50;

/// Source language value that asks the provider to detect the language.
pub const AUTO_LANGUAGE: &str = "auto";

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSLATION CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of a content hash in bytes.
pub const CONTENT_HASH_SIZE: usize = 32;

/// Domain separator for translation cache keys.
pub const DOMAIN_TRANSLATION_CACHE: &[u8] = b"AGORA_TRANSLATION_CACHE_V1";

/// Default time-to-live for cached translations (7 days).
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Default maximum number of cached translations.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Default interval between expired-entry purges (1 hour).
pub const DEFAULT_CACHE_CLEANUP_INTERVAL_SECONDS: u64 = 60 * 60;

// ═══════════════════════════════════════════════════════════════════════════════
// RATE LIMITING
// ═══════════════════════════════════════════════════════════════════════════════

/// Default rate-limit window (15 minutes).
pub const DEFAULT_RATE_LIMIT_WINDOW_SECONDS: u64 = 15 * 60;

/// Default number of requests allowed per window.
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;

/// Requests allowed per window on translation routes.
/// Lower than the default because every miss costs a provider call.
pub const DEFAULT_TRANSLATE_RATE_LIMIT_MAX_REQUESTS: u32 = 30;

/// Interval between sweeps of expired rate-limit windows.
pub const RATE_LIMIT_SWEEP_INTERVAL_SECONDS: u64 = 60;

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILE-TIME CHECKS
// ═══════════════════════════════════════════════════════════════════════════════

const _: () = {
    assert!(CONTENT_HASH_SIZE == 32);
    assert!(MAX_BATCH_SIZE > 0);
    assert!(DEFAULT_TRANSLATE_RATE_LIMIT_MAX_REQUESTS <= DEFAULT_RATE_LIMIT_MAX_REQUESTS);
};
