//! SHA-256 tree digests
//!
//! A [`Digest`] is either the `missing` sentinel or a 64-character lowercase
//! hex SHA-256. [`DigestAccumulator`] is the single running hasher a tree walk
//! feeds relative paths and file contents into.

use serde::{Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::io::Read;

/// Sentinel digest for a source tree that does not exist.
pub const MISSING: &str = "missing";

/// Number of characters shown when a digest is printed for humans.
const SHORT_LEN: usize = 8;

/// Fingerprint of a directory tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Digest {
    /// The source tree was absent
    Missing,
    /// Lowercase hex SHA-256 over every included (path, content) pair
    Sha256(String),
}

impl Digest {
    /// The persisted text form of this digest.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Missing => MISSING,
            Self::Sha256(hex) => hex,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Whether `persisted` holds exactly this digest.
    pub fn matches(&self, persisted: &str) -> bool {
        self.as_str() == persisted
    }

    /// Truncated form for log lines. Never use it for comparison.
    pub fn short(&self) -> &str {
        short_digest(self.as_str())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Truncate any digest-like text to its display prefix.
pub fn short_digest(text: &str) -> &str {
    match text.char_indices().nth(SHORT_LEN) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Running SHA-256 over a sequence of path and content chunks.
///
/// Order matters: callers must feed entries in canonical walk order.
#[derive(Debug, Clone, Default)]
pub struct DigestAccumulator {
    hasher: Sha256,
}

impl DigestAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the UTF-8 bytes of a relative path.
    pub fn update_path(&mut self, relative: &str) {
        self.hasher.update(relative.as_bytes());
    }

    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Stream a reader into the hash without buffering it whole.
    ///
    /// Returns the number of bytes consumed.
    pub fn update_reader<R: Read>(&mut self, reader: &mut R) -> std::io::Result<u64> {
        std::io::copy(reader, &mut self.hasher)
    }

    pub fn finish(self) -> Digest {
        Digest::Sha256(format!("{:x}", self.hasher.finalize()))
    }
}
