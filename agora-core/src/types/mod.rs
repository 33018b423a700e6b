//! Domain types for Agora.
//!
//! - [`LanguageCode`]: validated language code, or `auto` for detection
//! - [`TranslationRequest`]: text plus source and target language
//! - [`Translation`]: translated text and where it came from

mod language;
mod translation;

pub use language::*;
pub use translation::*;
