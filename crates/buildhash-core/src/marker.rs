//! Build marker discovery
//!
//! A build marker is the short build identifier a framework writes into its
//! output tree (Next.js writes `BUILD_ID`). It names content-addressed asset
//! directories, which the exclusion policy uses to skip them.

use std::fs;
use std::path::Path;

/// File name the marker is read from by default.
pub const DEFAULT_MARKER_FILE: &str = "BUILD_ID";

/// Build identifier read from inside a source tree. Empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildMarker(String);

impl BuildMarker {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// An absent marker.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read `file_name` from `source_dir`, trimming surrounding whitespace.
    ///
    /// A missing or unreadable file yields an empty marker. Invalid UTF-8 is
    /// decoded lossily.
    pub fn read(source_dir: &Path, file_name: &str) -> Self {
        let path = source_dir.join(file_name);
        match fs::read(&path) {
            Ok(bytes) => Self::new(String::from_utf8_lossy(&bytes)),
            Err(e) => {
                tracing::debug!("No build marker at {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
