//! Translator decorator backed by the translation cache.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, instrument};

use agora_cache::TranslationCache;
use agora_core::error::Result;
use agora_core::traits::Translator;
use agora_core::types::{Translation, TranslationRequest};

/// Wraps a provider with validation, same-language short-circuit, and caching.
///
/// Lookup order:
/// 1. Validate the request
/// 2. Return the text unchanged when source == target
/// 3. Answer from the cache (`cached = true`)
/// 4. Call the provider and cache its answer
pub struct CachingTranslator {
    inner: Arc<dyn Translator>,
    cache: Option<Arc<TranslationCache>>,
}

impl CachingTranslator {
    /// Creates a caching translator.
    pub fn new(inner: Arc<dyn Translator>, cache: Arc<TranslationCache>) -> Self {
        Self {
            inner,
            cache: Some(cache),
        }
    }

    /// Creates a translator that validates but never caches.
    pub fn uncached(inner: Arc<dyn Translator>) -> Self {
        Self { inner, cache: None }
    }

    /// Returns the cache, if caching is enabled.
    pub fn cache(&self) -> Option<&Arc<TranslationCache>> {
        self.cache.as_ref()
    }

    /// Translates several requests concurrently.
    ///
    /// Results are returned in input order; one failure does not affect
    /// the others.
    pub async fn translate_batch(&self, requests: &[TranslationRequest]) -> Vec<Result<Translation>> {
        join_all(requests.iter().map(|r| self.translate(r))).await
    }
}

#[async_trait]
impl Translator for CachingTranslator {
    #[instrument(skip(self, request), fields(source = %request.source, target = %request.target))]
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation> {
        request.validate()?;

        if request.is_noop() {
            return Ok(Translation::passthrough(request));
        }

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&request.text, &request.source, &request.target) {
                debug!(hash = %hit.hash, hits = hit.hit_count, "Translation cache hit");
                return Ok(Translation {
                    text: hit.translated_text,
                    source: request.source.clone(),
                    target: request.target.clone(),
                    detected_source: hit.detected_source,
                    cached: true,
                    provider: self.inner.name().to_string(),
                });
            }
        }

        let translation = self.inner.translate(request).await?;

        if let Some(cache) = &self.cache {
            let hash = cache.insert(
                &request.text,
                &request.source,
                &request.target,
                translation.text.clone(),
                translation.detected_source.clone(),
            );
            debug!(%hash, "Cached translation");
        }

        Ok(translation)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use agora_core::error::AgoraError;
    use agora_core::types::LanguageCode;

    /// Upper-cases text and counts calls.
    #[derive(Default)]
    struct ShoutTranslator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Translator for ShoutTranslator {
        async fn translate(&self, request: &TranslationRequest) -> Result<Translation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.text == "fail" {
                return Err(AgoraError::ProviderUnavailable("down".into()));
            }
            Ok(Translation {
                text: request.text.to_uppercase(),
                source: request.source.clone(),
                target: request.target.clone(),
                detected_source: request.source.is_auto().then(|| "en".to_string()),
                cached: false,
                provider: "shout".into(),
            })
        }

        fn name(&self) -> &str {
            "shout"
        }
    }

    fn request(text: &str, source: &str, target: &str) -> TranslationRequest {
        TranslationRequest::new(
            text,
            LanguageCode::parse(source).unwrap(),
            LanguageCode::parse(target).unwrap(),
        )
    }

    fn setup() -> (Arc<ShoutTranslator>, CachingTranslator) {
        let provider = Arc::new(ShoutTranslator::default());
        let translator = CachingTranslator::new(provider.clone(), Arc::new(TranslationCache::new()));
        (provider, translator)
    }

    #[tokio::test]
    async fn test_second_request_is_cached() {
        let (provider, translator) = setup();

        let first = translator.translate(&request("hello", "en", "fr")).await.unwrap();
        let second = translator.translate(&request("hello", "en", "fr")).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.text, "HELLO");
        assert_eq!(second.provider, "shout");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_detected_language_survives_cache() {
        let (_, translator) = setup();

        translator.translate(&request("hello", "auto", "fr")).await.unwrap();
        let hit = translator.translate(&request("hello", "auto", "fr")).await.unwrap();

        assert!(hit.cached);
        assert_eq!(hit.detected_source.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_same_language_skips_provider() {
        let (provider, translator) = setup();

        let result = translator.translate(&request("hello", "en", "en")).await.unwrap();

        assert_eq!(result.text, "hello");
        assert_eq!(result.provider, "passthrough");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(translator.cache().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_request_skips_provider() {
        let (provider, translator) = setup();

        let err = translator.translate(&request("  ", "en", "fr")).await.unwrap_err();

        assert!(matches!(err, AgoraError::EmptyText));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let (provider, translator) = setup();

        assert!(translator.translate(&request("fail", "en", "fr")).await.is_err());
        assert!(translator.translate(&request("fail", "en", "fr")).await.is_err());

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(translator.cache().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_uncached_always_calls_provider() {
        let provider = Arc::new(ShoutTranslator::default());
        let translator = CachingTranslator::uncached(provider.clone());

        translator.translate(&request("hello", "en", "fr")).await.unwrap();
        let second = translator.translate(&request("hello", "en", "fr")).await.unwrap();

        assert!(!second.cached);
        assert!(translator.cache().is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_uncached_same_language_skips_provider() {
        let provider = Arc::new(ShoutTranslator::default());
        let translator = CachingTranslator::uncached(provider.clone());

        let result = translator.translate(&request("hello", "fr", "fr")).await.unwrap();

        assert_eq!(result.text, "hello");
        assert_eq!(result.provider, "passthrough");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let (_, translator) = setup();

        let results = translator
            .translate_batch(&[
                request("one", "en", "de"),
                request("fail", "en", "de"),
                request("", "en", "de"),
                request("two", "en", "de"),
            ])
            .await;

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().text, "ONE");
        assert!(matches!(results[1], Err(AgoraError::ProviderUnavailable(_))));
        assert!(matches!(results[2], Err(AgoraError::EmptyText)));
        assert_eq!(results[3].as_ref().unwrap().text, "TWO");
    }
}
