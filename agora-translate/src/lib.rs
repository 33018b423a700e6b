//! # Agora Translate
//!
//! Translators for the Agora service.
//!
//! - [`HttpTranslator`]: client for a LibreTranslate-compatible HTTP API
//! - [`CachingTranslator`]: validates requests, short-circuits same-language
//!   requests, and answers repeats from a [`TranslationCache`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use agora_cache::TranslationCache;
//! use agora_translate::{CachingTranslator, HttpTranslator, HttpTranslatorConfig};
//!
//! let provider = HttpTranslator::with_config(HttpTranslatorConfig::new("http://localhost:5000"))?;
//! let translator = CachingTranslator::new(Arc::new(provider), Arc::new(TranslationCache::new()));
//! let result = translator.translate(&request).await?;
//! ```
//!
//! [`TranslationCache`]: agora_cache::TranslationCache

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cached;
mod http;

pub use cached::CachingTranslator;
pub use http::{HttpTranslator, HttpTranslatorConfig};

pub use agora_core::traits::Translator;
