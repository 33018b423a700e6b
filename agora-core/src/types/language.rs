//! Language codes accepted by the translation service.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::AUTO_LANGUAGE;
use crate::error::{AgoraError, Result};

/// Language codes supported by the upstream translation service.
///
/// Region subtags are stored in canonical form (`zh-TW`, `fr-CA`).
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "af", "am", "ar", "az", "bg", "bn", "bs", "ca", "cs", "cy", "da", "de", "el", "en",
    "es", "es-MX", "et", "fa", "fa-AF", "fi", "fr", "fr-CA", "ga", "gu", "ha", "he", "hi",
    "hr", "ht", "hu", "hy", "id", "is", "it", "ja", "ka", "kk", "kn", "ko", "lt", "lv",
    "mk", "ml", "mn", "mr", "ms", "mt", "nl", "no", "pa", "pl", "ps", "pt", "pt-PT", "ro",
    "ru", "si", "sk", "sl", "so", "sq", "sr", "sv", "sw", "ta", "te", "th", "tl", "tr",
    "uk", "ur", "uz", "vi", "zh", "zh-TW",
];

/// A validated, normalized language code.
///
/// Either one of [`SUPPORTED_LANGUAGES`] or the special value `auto`,
/// which asks the provider to detect the source language.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parses and normalizes a language code.
    ///
    /// Accepts any case and `_` as subtag separator: `ZH_tw` → `zh-TW`.
    pub fn parse(code: &str) -> Result<Self> {
        let normalized = Self::normalize(code);

        if normalized == AUTO_LANGUAGE || SUPPORTED_LANGUAGES.contains(&normalized.as_str()) {
            Ok(Self(normalized))
        } else {
            Err(AgoraError::UnsupportedLanguage(code.trim().to_string()))
        }
    }

    /// The automatic-detection source language.
    pub fn auto() -> Self {
        Self(AUTO_LANGUAGE.to_string())
    }

    /// Returns true for `auto`.
    pub fn is_auto(&self) -> bool {
        self.0 == AUTO_LANGUAGE
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the primary subtag (`zh` for `zh-TW`).
    pub fn primary(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    fn normalize(code: &str) -> String {
        let code = code.trim().replace('_', "-");
        let mut parts = code.split('-');
        let mut out = parts.next().unwrap_or_default().to_ascii_lowercase();
        for part in parts {
            out.push('-');
            out.push_str(&part.to_ascii_uppercase());
        }
        out
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = AgoraError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = AgoraError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
