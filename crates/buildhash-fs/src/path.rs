//! Normalized path handling for cross-platform compatibility

use std::path::{Component, Path};

/// A path normalized to use forward slashes internally.
///
/// Relative paths fed into a digest must be byte-identical on every
/// platform, so the internal form always uses `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes for internal storage.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let normalized = path_str.replace('\\', "/");
        Self { inner: normalized }
    }

    /// Express `path` relative to `root`, joined with `/`.
    ///
    /// Returns `None` when `path` is not inside `root`, equals it, or has a
    /// component that is not valid UTF-8.
    pub fn relative_to(root: &Path, path: &Path) -> Option<Self> {
        let rest = path.strip_prefix(root).ok()?;
        let mut parts = Vec::new();
        for component in rest.components() {
            if let Component::Normal(part) = component {
                parts.push(part.to_str()?);
            }
        }
        if parts.is_empty() {
            return None;
        }
        Some(Self {
            inner: parts.join("/"),
        })
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}
