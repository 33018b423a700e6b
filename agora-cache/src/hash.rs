//! Content hashes used as cache keys.
//!
//! ```text
//! key = SHAKE256(len(domain) || domain || len(text) || text
//!                || len(source) || source || len(target) || target, 32)
//! ```
//!
//! Every input is length-prefixed so that moving bytes between fields can
//! never produce the same key.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};

use agora_core::constants::{CONTENT_HASH_SIZE, DOMAIN_TRANSLATION_CACHE};
use agora_core::error::{AgoraError, Result};
use agora_core::types::LanguageCode;

/// 32-byte digest identifying one (text, source, target) triple.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash([u8; CONTENT_HASH_SIZE]);

impl ContentHash {
    /// Wraps raw digest bytes.
    pub fn from_bytes(bytes: [u8; CONTENT_HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; CONTENT_HASH_SIZE] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex digest, with or without `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);

        let bytes = hex::decode(s)
            .map_err(|e| AgoraError::InvalidContentHash(format!("not hex: {}", e)))?;

        let arr: [u8; CONTENT_HASH_SIZE] = bytes.as_slice().try_into().map_err(|_| {
            AgoraError::InvalidContentHash(format!(
                "expected {} bytes, got {}",
                CONTENT_HASH_SIZE,
                bytes.len()
            ))
        })?;

        Ok(Self(arr))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl TryFrom<String> for ContentHash {
    type Error = AgoraError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.to_hex()
    }
}

/// Computes the cache key for a translation.
pub fn content_hash(text: &str, source: &LanguageCode, target: &LanguageCode) -> ContentHash {
    let mut hasher = Shake256::default();

    hasher.update(&(DOMAIN_TRANSLATION_CACHE.len() as u32).to_le_bytes());
    hasher.update(DOMAIN_TRANSLATION_CACHE);

    for input in [text.as_bytes(), source.as_str().as_bytes(), target.as_str().as_bytes()] {
        hasher.update(&(input.len() as u64).to_le_bytes());
        hasher.update(input);
    }

    let mut reader = hasher.finalize_xof();
    let mut output = [0u8; CONTENT_HASH_SIZE];
    reader.read(&mut output);

    ContentHash(output)
}
