//! # Agora Cache
//!
//! Content-addressed cache for translated text.
//!
//! Entries are keyed by a SHAKE256 digest of (text, source language, target
//! language). Each entry carries its own TTL and hit count, and the cache
//! keeps least-recently-accessed order so it can be trimmed to a size limit.
//!
//! ## Example
//!
//! ```rust
//! use agora_cache::TranslationCache;
//! use agora_core::LanguageCode;
//!
//! let es = LanguageCode::parse("es").unwrap();
//! let en = LanguageCode::parse("en").unwrap();
//!
//! let cache = TranslationCache::new();
//! cache.insert("Hola", &es, &en, "Hello", None);
//!
//! let hit = cache.get("Hola", &es, &en).unwrap();
//! assert_eq!(hit.translated_text, "Hello");
//! assert_eq!(hit.hit_count, 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod hash;

pub use cache::{
    CacheConfig, CacheEntryInfo, CacheStats, CachedTranslation, TranslationCache, CAPACITY_PURGE_COOLDOWN,
};
pub use hash::{content_hash, ContentHash};
