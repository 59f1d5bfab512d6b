//! Deterministic directory traversal
//!
//! [`TreeWalker`] yields every entry below a root in canonical order: at each
//! level, entries are sorted by file name using plain byte (code point)
//! ordering, never the host's native listing order or locale collation.
//! Symlinks are reported but never followed.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{Error, NormalizedPath, Result};

/// What kind of filesystem object a walk entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, sockets, devices and anything else
    Other,
}

/// One entry produced by a [`TreeWalker`].
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Path relative to the walk root, `/` separated
    pub relative: NormalizedPath,
    /// Absolute (root-joined) path for I/O
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Sorted, depth-first walk over a directory tree.
///
/// The root itself is never yielded.
pub struct TreeWalker {
    root: PathBuf,
    inner: walkdir::IntoIter,
    last_kind: Option<EntryKind>,
}

impl TreeWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let inner = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Self {
            root,
            inner,
            last_kind: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Do not descend into the directory that was just yielded.
    ///
    /// Has no effect unless the previous entry was a directory.
    pub fn skip_subtree(&mut self) {
        if self.last_kind == Some(EntryKind::Dir) {
            self.inner.skip_current_dir();
            self.last_kind = None;
        }
    }
}

impl Iterator for TreeWalker {
    type Item = Result<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(source) => {
                self.last_kind = None;
                let path = source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone());
                return Some(Err(Error::Walk { path, source }));
            }
        };

        // Lossy names could collide in the digest
        let Some(relative) = NormalizedPath::relative_to(&self.root, entry.path()) else {
            self.last_kind = None;
            return Some(Err(Error::NonUtf8Path {
                path: entry.into_path(),
            }));
        };

        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        self.last_kind = Some(kind);

        Some(Ok(WalkEntry {
            relative,
            path: entry.into_path(),
            kind,
        }))
    }
}
