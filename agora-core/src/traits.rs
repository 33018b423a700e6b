//! Common traits for Agora.
//!
//! Providers implement [`Translator`]; decorators such as the caching
//! translator wrap another `Translator` and implement it again.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Translation, TranslationRequest};

/// Interface for translation providers.
///
/// Implementations might be:
/// - A remote HTTP translation API
/// - A caching layer in front of another translator
/// - A fixed mapping (for testing)
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translates the request text from its source to its target language.
    ///
    /// Callers are expected to have run [`TranslationRequest::validate`].
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation>;

    /// Short provider name reported in responses and logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for std::sync::Arc<T> {
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation> {
        (**self).translate(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
