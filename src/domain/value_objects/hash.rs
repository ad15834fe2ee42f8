//! Content Hash Value Object
//!
//! Hashes of file text. The watch driver compares them to ignore saves that
//! did not change a file, and the compiler host uses them as source-file
//! versions.

use std::fmt;

/// SHA-256 content hash, rendered with a `sha256:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    pub const PREFIX: &'static str = "sha256:";

    /// Wrap an existing hash string, adding the prefix if missing.
    pub fn new(raw_hash: &str) -> Self {
        if raw_hash.starts_with(Self::PREFIX) {
            Self(raw_hash.to_string())
        } else {
            Self(format!("{}{}", Self::PREFIX, raw_hash))
        }
    }

    /// Compute the SHA-256 of `content`.
    pub fn from_content(content: &str) -> Self {
        use sha2::{Digest, Sha256};
        let hash = Sha256::digest(content.as_bytes());
        Self(format!("{}{:x}", Self::PREFIX, hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex digits without the prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// djb2 string hash, used as a source version when the host has no hasher.
pub fn string_hash(text: &str) -> String {
    let hash = text
        .bytes()
        .fold(5381u32, |acc, b| acc.wrapping_shl(5).wrapping_add(acc).wrapping_add(u32::from(b)));
    hash.to_string()
}
