//! In-memory TTL cache for translations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use agora_core::constants::{DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_SECONDS};
use agora_core::types::LanguageCode;

use crate::hash::{content_hash, ContentHash};

/// Minimum time between purges triggered by a full cache.
pub const CAPACITY_PURGE_COOLDOWN: Duration = Duration::from_secs(1);

/// Cache entry with TTL and access bookkeeping.
#[derive(Clone)]
struct CacheEntry {
    source_text: String,
    source: LanguageCode,
    target: LanguageCode,
    translated_text: String,
    detected_source: Option<String>,
    created_at: DateTime<Utc>,
    inserted_at: Instant,
    last_accessed: Instant,
    ttl: Duration,
    hit_count: u64,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }

    fn matches(&self, text: &str, source: &LanguageCode, target: &LanguageCode) -> bool {
        self.source_text == text && &self.source == source && &self.target == target
    }

    fn snapshot(&self, hash: ContentHash) -> CachedTranslation {
        CachedTranslation {
            hash,
            translated_text: self.translated_text.clone(),
            detected_source: self.detected_source.clone(),
            hit_count: self.hit_count,
            created_at: self.created_at,
        }
    }

    fn info(&self, hash: ContentHash) -> CacheEntryInfo {
        CacheEntryInfo {
            hash,
            source_text: self.source_text.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            translated_text: self.translated_text.clone(),
            hit_count: self.hit_count,
            created_at: self.created_at,
            expires_in_seconds: self.ttl.saturating_sub(self.inserted_at.elapsed()).as_secs(),
        }
    }
}

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// Default TTL in seconds
    pub default_ttl_seconds: u64,
    /// Whether a full cache purges expired entries before evicting live
    /// ones (at most once per [`CAPACITY_PURGE_COOLDOWN`])
    pub auto_cleanup: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            default_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            auto_cleanup: true,
        }
    }
}

/// A cache hit.
#[derive(Clone, Debug, Serialize)]
pub struct CachedTranslation {
    /// Content hash of the entry
    pub hash: ContentHash,
    /// Cached translated text
    pub translated_text: String,
    /// Language the provider detected, if the source was `auto`
    pub detected_source: Option<String>,
    /// Hits including this one
    pub hit_count: u64,
    /// When the entry was stored
    pub created_at: DateTime<Utc>,
}

/// Public view of an entry, used for listings.
#[derive(Clone, Debug, Serialize)]
pub struct CacheEntryInfo {
    /// Content hash of the entry
    pub hash: ContentHash,
    /// Original text
    pub source_text: String,
    /// Source language as requested
    pub source: LanguageCode,
    /// Target language
    pub target: LanguageCode,
    /// Cached translated text
    pub translated_text: String,
    /// Hits since the entry was stored
    pub hit_count: u64,
    /// When the entry was stored
    pub created_at: DateTime<Utc>,
    /// Seconds until the entry expires
    pub expires_in_seconds: u64,
}

/// In-memory translation cache.
///
/// Thread-safe. Entries expire after their TTL and are kept in
/// least-recently-accessed order so the cache can be trimmed.
pub struct TranslationCache {
    entries: Mutex<LruCache<ContentHash, CacheEntry>>,
    config: CacheConfig,
    lookup_hits: AtomicU64,
    lookup_misses: AtomicU64,
    last_capacity_purge: Mutex<Option<Instant>>,
}

impl TranslationCache {
    /// Creates a new cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            // Unbounded: capacity is enforced in `insert_with_ttl`.
            entries: Mutex::new(LruCache::unbounded()),
            config,
            lookup_hits: AtomicU64::new(0),
            lookup_misses: AtomicU64::new(0),
            last_capacity_purge: Mutex::new(None),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Looks up a translation.
    ///
    /// A hit increments the entry's hit count and marks it most recently
    /// used. Expired entries are removed and reported as misses.
    pub fn get(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Option<CachedTranslation> {
        let hash = content_hash(text, source, target);
        self.lookup(&hash, |e| e.matches(text, source, target))
    }

    /// Looks up a translation by its content hash.
    pub fn get_by_hash(&self, hash: &ContentHash) -> Option<CachedTranslation> {
        self.lookup(hash, |_| true)
    }

    fn lookup(
        &self,
        hash: &ContentHash,
        accept: impl FnOnce(&CacheEntry) -> bool,
    ) -> Option<CachedTranslation> {
        let mut entries = self.entries.lock();

        let state = entries.peek(hash).map(|e| (e.is_expired(), accept(e)));
        let result = match state {
            Some((true, _)) => {
                entries.pop(hash);
                debug!(%hash, "Dropped expired cache entry");
                None
            }
            Some((false, true)) => entries.get_mut(hash).map(|e| {
                e.hit_count += 1;
                e.last_accessed = Instant::now();
                e.snapshot(*hash)
            }),
            Some((false, false)) | None => None,
        };
        drop(entries);

        if result.is_some() {
            self.lookup_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.lookup_misses.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    /// Caches a translation with the default TTL.
    pub fn insert(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
        translated_text: impl Into<String>,
        detected_source: Option<String>,
    ) -> ContentHash {
        self.insert_with_ttl(
            text,
            source,
            target,
            translated_text,
            detected_source,
            Duration::from_secs(self.config.default_ttl_seconds),
        )
    }

    /// Caches a translation with a custom TTL.
    ///
    /// Replacing an existing entry resets its TTL and hit count.
    pub fn insert_with_ttl(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
        translated_text: impl Into<String>,
        detected_source: Option<String>,
        ttl: Duration,
    ) -> ContentHash {
        let hash = content_hash(text, source, target);
        if self.config.max_entries == 0 {
            return hash;
        }

        let mut entries = self.entries.lock();

        if !entries.contains(&hash) && entries.len() >= self.config.max_entries {
            if self.config.auto_cleanup && self.capacity_purge_due() {
                let removed = Self::purge_expired(&mut entries);
                debug!(removed, "Purged expired entries at capacity");
            }
            while entries.len() >= self.config.max_entries {
                match entries.pop_lru() {
                    Some((evicted, _)) => debug!(hash = %evicted, "Evicted least recently used entry"),
                    None => break,
                }
            }
        }

        let now = Instant::now();
        entries.put(
            hash,
            CacheEntry {
                source_text: text.to_string(),
                source: source.clone(),
                target: target.clone(),
                translated_text: translated_text.into(),
                detected_source,
                created_at: Utc::now(),
                inserted_at: now,
                last_accessed: now,
                ttl,
                hit_count: 0,
            },
        );

        hash
    }

    /// Full scans are O(n) under the lock; between them a full cache
    /// evicts by LRU and leaves expired entries to `cleanup_expired`.
    fn capacity_purge_due(&self) -> bool {
        let mut last = self.last_capacity_purge.lock();
        let now = Instant::now();
        match *last {
            Some(at) if now.saturating_duration_since(at) < CAPACITY_PURGE_COOLDOWN => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Removes a cached entry. Returns true if it existed.
    pub fn remove(&self, hash: &ContentHash) -> bool {
        self.entries.lock().pop(hash).is_some()
    }

    /// Clears all cached entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Removes all expired entries and returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let removed = Self::purge_expired(&mut self.entries.lock());
        if removed > 0 {
            info!(removed, "Purged expired translations");
        }
        removed
    }

    fn purge_expired(entries: &mut LruCache<ContentHash, CacheEntry>) -> usize {
        let expired: Vec<ContentHash> = entries
            .iter()
            .filter(|(_, e)| e.is_expired())
            .map(|(k, _)| *k)
            .collect();

        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    /// Evicts least-recently-accessed entries until at most `max_entries`
    /// remain. Returns the number evicted.
    pub fn enforce_size_limit(&self, max_entries: usize) -> usize {
        let mut entries = self.entries.lock();
        let mut evicted = 0;

        while entries.len() > max_entries {
            if entries.pop_lru().is_none() {
                break;
            }
            evicted += 1;
        }

        if evicted > 0 {
            info!(evicted, remaining = entries.len(), max_entries, "Enforced cache size limit");
        }
        evicted
    }

    /// Returns the number of cached entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns the most frequently hit live entries, highest first.
    ///
    /// Ties are broken by most recent access.
    pub fn popular(&self, limit: usize) -> Vec<CacheEntryInfo> {
        let entries = self.entries.lock();

        let mut live: Vec<(u64, Instant, CacheEntryInfo)> = entries
            .iter()
            .filter(|(_, e)| !e.is_expired())
            .map(|(k, e)| (e.hit_count, e.last_accessed, e.info(*k)))
            .collect();
        drop(entries);

        live.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        live.into_iter().take(limit).map(|(_, _, info)| info).collect()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let mut expired = 0;
        let mut total_hits = 0;
        for (_, e) in entries.iter() {
            if e.is_expired() {
                expired += 1;
            }
            total_hits += e.hit_count;
        }
        let total_entries = entries.len();
        drop(entries);

        let lookup_hits = self.lookup_hits.load(Ordering::Relaxed);
        let lookup_misses = self.lookup_misses.load(Ordering::Relaxed);
        let lookups = lookup_hits + lookup_misses;

        CacheStats {
            total_entries,
            expired_entries: expired,
            valid_entries: total_entries.saturating_sub(expired),
            capacity: self.config.max_entries,
            total_hits,
            lookup_hits,
            lookup_misses,
            hit_rate: if lookups > 0 {
                lookup_hits as f64 / lookups as f64
            } else {
                0.0
            },
        }
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Clone, Debug, Serialize)]
pub struct CacheStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Expired entries awaiting purge
    pub expired_entries: usize,
    /// Valid (non-expired) entries
    pub valid_entries: usize,
    /// Maximum capacity
    pub capacity: usize,
    /// Sum of hit counts over stored entries
    pub total_hits: u64,
    /// Lookups answered from the cache since startup
    pub lookup_hits: u64,
    /// Lookups that missed since startup
    pub lookup_misses: u64,
    /// `lookup_hits / (lookup_hits + lookup_misses)`
    pub hit_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::parse(code).unwrap()
    }

    fn small_cache(max_entries: usize) -> TranslationCache {
        TranslationCache::with_config(CacheConfig {
            max_entries,
            default_ttl_seconds: 3600,
            auto_cleanup: true,
        })
    }

    #[test]
    fn test_cache_set_get() {
        let cache = TranslationCache::new();
        cache.insert("Hola", &lang("es"), &lang("en"), "Hello", None);

        let hit = cache.get("Hola", &lang("es"), &lang("en")).unwrap();
        assert_eq!(hit.translated_text, "Hello");
        assert_eq!(hit.hash, content_hash("Hola", &lang("es"), &lang("en")));
    }

    #[test]
    fn test_cache_miss() {
        let cache = TranslationCache::new();
        cache.insert("Hola", &lang("es"), &lang("en"), "Hello", None);

        assert!(cache.get("Hola", &lang("es"), &lang("de")).is_none());
        assert!(cache.get("Adios", &lang("es"), &lang("en")).is_none());
    }

    #[test]
    fn test_hit_count_increments() {
        let cache = TranslationCache::new();
        cache.insert("Hola", &lang("es"), &lang("en"), "Hello", None);

        for expected in 1..=3 {
            let hit = cache.get("Hola", &lang("es"), &lang("en")).unwrap();
            assert_eq!(hit.hit_count, expected);
        }
    }

    #[test]
    fn test_reinsert_resets_hit_count() {
        let cache = TranslationCache::new();
        cache.insert("Hola", &lang("es"), &lang("en"), "Hello", None);
        cache.get("Hola", &lang("es"), &lang("en"));
        cache.insert("Hola", &lang("es"), &lang("en"), "Hi", None);

        let hit = cache.get("Hola", &lang("es"), &lang("en")).unwrap();
        assert_eq!(hit.translated_text, "Hi");
        assert_eq!(hit.hit_count, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_by_hash() {
        let cache = TranslationCache::new();
        let hash = cache.insert("Hola", &lang("auto"), &lang("en"), "Hello", Some("es".into()));

        let hit = cache.get_by_hash(&hash).unwrap();
        assert_eq!(hit.detected_source.as_deref(), Some("es"));
    }

    #[test]
    fn test_cache_remove() {
        let cache = TranslationCache::new();
        let hash = cache.insert("Hola", &lang("es"), &lang("en"), "Hello", None);

        assert!(cache.remove(&hash));
        assert!(!cache.remove(&hash));
        assert!(cache.get_by_hash(&hash).is_none());
    }

    #[test]
    fn test_cache_clear() {
        let cache = TranslationCache::new();
        cache.insert("Hola", &lang("es"), &lang("en"), "Hello", None);
        cache.insert("Adios", &lang("es"), &lang("en"), "Goodbye", None);

        cache.clear();

        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_ttl_expiration() {
        let cache = TranslationCache::new();
        cache.insert_with_ttl(
            "Hola",
            &lang("es"),
            &lang("en"),
            "Hello",
            None,
            Duration::from_millis(1),
        );

        std::thread::sleep(Duration::from_millis(10));

        assert!(cache.get("Hola", &lang("es"), &lang("en")).is_none());
        // Expired entry is dropped on lookup
        assert!(cache.is_empty());
    }

    #[test]
    fn test_reads_do_not_extend_ttl() {
        let cache = TranslationCache::new();
        cache.insert_with_ttl(
            "Hola",
            &lang("es"),
            &lang("en"),
            "Hello",
            None,
            Duration::from_millis(200),
        );

        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get("Hola", &lang("es"), &lang("en")).is_some());
        std::thread::sleep(Duration::from_millis(220));
        assert!(cache.get("Hola", &lang("es"), &lang("en")).is_none());
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = small_cache(2);
        cache.insert("one", &lang("en"), &lang("fr"), "un", None);
        cache.insert("two", &lang("en"), &lang("fr"), "deux", None);

        // Touch "one" so "two" becomes the eviction candidate
        assert!(cache.get("one", &lang("en"), &lang("fr")).is_some());
        cache.insert("three", &lang("en"), &lang("fr"), "trois", None);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("one", &lang("en"), &lang("fr")).is_some());
        assert!(cache.get("two", &lang("en"), &lang("fr")).is_none());
        assert!(cache.get("three", &lang("en"), &lang("fr")).is_some());
    }

    #[test]
    fn test_capacity_prefers_purging_expired() {
        let cache = small_cache(2);
        cache.insert_with_ttl(
            "stale",
            &lang("en"),
            &lang("fr"),
            "périmé",
            None,
            Duration::from_millis(1),
        );
        cache.insert("fresh", &lang("en"), &lang("fr"), "frais", None);
        // Make "fresh" the least recently used of the two
        cache.get_by_hash(&content_hash("stale", &lang("en"), &lang("fr")));
        std::thread::sleep(Duration::from_millis(10));

        cache.insert("new", &lang("en"), &lang("fr"), "nouveau", None);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("fresh", &lang("en"), &lang("fr")).is_some());
    }

    #[test]
    fn test_capacity_purge_has_cooldown() {
        let cache = small_cache(2);
        let short = Duration::from_millis(1);
        cache.insert_with_ttl("old", &lang("en"), &lang("fr"), "vieux", None, short);
        cache.insert("fresh", &lang("en"), &lang("fr"), "frais", None);
        std::thread::sleep(Duration::from_millis(10));

        // First full insert purges "old"
        cache.insert("a", &lang("en"), &lang("fr"), "a", None);
        assert!(cache.get_by_hash(&content_hash("old", &lang("en"), &lang("fr"))).is_none());
        assert!(cache.get("fresh", &lang("en"), &lang("fr")).is_some());

        // Evicts "a" (LRU) to make room for the short-lived entry
        cache.insert_with_ttl("stale", &lang("en"), &lang("fr"), "périmé", None, short);
        std::thread::sleep(Duration::from_millis(10));

        // Within the cooldown: no purge, so the live LRU entry goes instead
        cache.insert("b", &lang("en"), &lang("fr"), "b", None);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("fresh", &lang("en"), &lang("fr")).is_none());
        assert!(cache.get("b", &lang("en"), &lang("fr")).is_some());
        assert_eq!(cache.stats().expired_entries, 1);

        assert_eq!(cache.cleanup_expired(), 1);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = small_cache(0);
        cache.insert("one", &lang("en"), &lang("fr"), "un", None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_enforce_size_limit() {
        let cache = TranslationCache::new();
        for i in 0..10 {
            cache.insert(&format!("text {}", i), &lang("en"), &lang("de"), format!("Text {}", i), None);
        }
        // Keep 0 and 1 warm
        cache.get("text 0", &lang("en"), &lang("de"));
        cache.get("text 1", &lang("en"), &lang("de"));

        let evicted = cache.enforce_size_limit(3);

        assert_eq!(evicted, 7);
        assert_eq!(cache.len(), 3);
        assert!(cache.get("text 0", &lang("en"), &lang("de")).is_some());
        assert!(cache.get("text 1", &lang("en"), &lang("de")).is_some());
        assert!(cache.get("text 9", &lang("en"), &lang("de")).is_some());
        assert_eq!(cache.enforce_size_limit(3), 0);
    }

    #[test]
    fn test_cache_cleanup_expired() {
        let cache = TranslationCache::new();
        cache.insert_with_ttl("a", &lang("en"), &lang("fr"), "a", None, Duration::from_millis(1));
        cache.insert("b", &lang("en"), &lang("fr"), "b", None);

        std::thread::sleep(Duration::from_millis(10));

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("b", &lang("en"), &lang("fr")).is_some());
    }

    #[test]
    fn test_cache_stats() {
        let cache = TranslationCache::new();
        cache.insert("a", &lang("en"), &lang("fr"), "a", None);
        cache.insert("b", &lang("en"), &lang("fr"), "b", None);
        cache.get("a", &lang("en"), &lang("fr"));
        cache.get("a", &lang("en"), &lang("fr"));
        cache.get("missing", &lang("en"), &lang("fr"));

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.valid_entries, 2);
        assert_eq!(stats.expired_entries, 0);
        assert_eq!(stats.total_hits, 2);
        assert_eq!(stats.lookup_hits, 2);
        assert_eq!(stats.lookup_misses, 1);
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_popular_orders_by_hits() {
        let cache = TranslationCache::new();
        cache.insert("a", &lang("en"), &lang("fr"), "a", None);
        cache.insert("b", &lang("en"), &lang("fr"), "b", None);
        cache.insert("c", &lang("en"), &lang("fr"), "c", None);
        for _ in 0..3 {
            cache.get("b", &lang("en"), &lang("fr"));
        }
        cache.get("c", &lang("en"), &lang("fr"));

        let popular = cache.popular(2);
        assert_eq!(popular.len(), 2);
        assert_eq!(popular[0].source_text, "b");
        assert_eq!(popular[0].hit_count, 3);
        assert_eq!(popular[1].source_text, "c");
    }

    #[test]
    fn test_popular_ties_prefer_recent_access() {
        let cache = TranslationCache::new();
        cache.insert("a", &lang("en"), &lang("fr"), "a", None);
        cache.insert("b", &lang("en"), &lang("fr"), "b", None);

        cache.get("b", &lang("en"), &lang("fr"));
        std::thread::sleep(Duration::from_millis(5));
        cache.get("a", &lang("en"), &lang("fr"));

        let popular = cache.popular(10);
        assert_eq!(popular[0].hit_count, popular[1].hit_count);
        assert_eq!(popular[0].source_text, "a");
        assert_eq!(popular[1].source_text, "b");
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;

        let cache = Arc::new(small_cache(64));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let text = format!("{}-{}", t, i);
                        cache.insert(&text, &lang("en"), &lang("es"), text.clone(), None);
                        cache.get(&text, &lang("en"), &lang("es"));
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert!(cache.len() <= 64);
    }
}
