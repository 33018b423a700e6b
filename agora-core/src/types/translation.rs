//! Translation request and result types.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_TRANSLATION_TEXT_BYTES;
use crate::error::{AgoraError, Result};
use crate::types::LanguageCode;

/// A request to translate one piece of text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Text to translate
    pub text: String,
    /// Source language, or `auto` for detection
    pub source: LanguageCode,
    /// Target language
    pub target: LanguageCode,
}

impl TranslationRequest {
    /// Creates a new request.
    pub fn new(text: impl Into<String>, source: LanguageCode, target: LanguageCode) -> Self {
        Self {
            text: text.into(),
            source,
            target,
        }
    }

    /// Validates text size and language roles.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(AgoraError::EmptyText);
        }

        if self.text.len() > MAX_TRANSLATION_TEXT_BYTES {
            return Err(AgoraError::TextTooLong {
                max: MAX_TRANSLATION_TEXT_BYTES,
                actual: self.text.len(),
            });
        }

        if self.target.is_auto() {
            return Err(AgoraError::InvalidTargetLanguage(self.target.to_string()));
        }

        Ok(())
    }

    /// Returns true when source and target are the same known language.
    ///
    /// Such requests are answered with the original text.
    pub fn is_noop(&self) -> bool {
        !self.source.is_auto() && self.source == self.target
    }
}

/// A translated text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Translated text
    pub text: String,
    /// Source language as requested
    pub source: LanguageCode,
    /// Target language
    pub target: LanguageCode,
    /// Language detected by the provider when the source was `auto`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_source: Option<String>,
    /// Whether the result came from the cache
    pub cached: bool,
    /// Name of the translator that produced the text
    pub provider: String,
}

impl Translation {
    /// Builds the identity result for a no-op request.
    pub fn passthrough(request: &TranslationRequest) -> Self {
        Self {
            text: request.text.clone(),
            source: request.source.clone(),
            target: request.target.clone(),
            detected_source: None,
            cached: false,
            provider: "passthrough".into(),
        }
    }
}
