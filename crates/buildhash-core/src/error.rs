//! Error types for buildhash-core

use std::path::PathBuf;

/// Result type for buildhash-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in buildhash-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Walking or reading the source tree failed part-way
    #[error("Failed to fingerprint {dir}: {source}")]
    Fingerprint {
        dir: PathBuf,
        #[source]
        source: buildhash_fs::Error,
    },

    /// A new digest was computed but could not be written
    #[error("Failed to persist digest to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: buildhash_fs::Error,
    },

    /// Configuration file could not be parsed
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Configuration parsed but describes an invalid registry
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Lookup of a target id that is not registered
    #[error("Unknown target: {id}")]
    UnknownTarget { id: String },

    /// Filesystem error from buildhash-fs
    #[error(transparent)]
    Fs(#[from] buildhash_fs::Error),

    /// TOML parse error
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error happened while writing rather than reading.
    pub fn is_persist(&self) -> bool {
        matches!(self, Self::Persist { .. })
    }
}
