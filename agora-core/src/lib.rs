//! # Agora Core
//!
//! Core types, errors, and traits shared by every Agora crate.
//!
//! - **Types**: language codes, translation requests and results
//! - **Errors**: one error enum for validation, provider, and cache failures
//! - **Constants**: cache, text-size, and rate-limit defaults
//! - **Traits**: the [`Translator`] interface implemented by providers
//!
//! ## Example
//!
//! ```rust
//! use agora_core::{LanguageCode, TranslationRequest};
//!
//! let request = TranslationRequest::new(
//!     "Hola",
//!     LanguageCode::parse("es").unwrap(),
//!     LanguageCode::parse("en").unwrap(),
//! );
//! assert!(request.validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::{AgoraError, Result};
pub use traits::*;
pub use types::*;
