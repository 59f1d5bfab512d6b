//! [`TestTree`] builder for fingerprinting scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory with helpers for laying out build output.
///
/// # Example
///
/// ```rust,no_run
/// use buildhash_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.write("apps/web/.next/server/index.html", "A");
/// tree.write("apps/web/.next/BUILD_ID", "abc123");
/// tree.assert_file_exists("apps/web/.next/BUILD_ID");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `rel` below the root.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: impl AsRef<[u8]>) -> &Self {
        let full_path = self.path(rel);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        self
    }

    /// Create an (empty) directory at `rel`.
    pub fn mkdir(&self, rel: &str) -> &Self {
        fs::create_dir_all(self.path(rel)).unwrap();
        self
    }

    /// Remove a file or a whole directory at `rel`.
    pub fn remove(&self, rel: &str) -> &Self {
        let full_path = self.path(rel);
        if full_path.is_dir() {
            fs::remove_dir_all(&full_path).unwrap();
        } else {
            fs::remove_file(&full_path).unwrap();
        }
        self
    }

    /// Move `from` to `to`, creating parents of `to`.
    pub fn rename(&self, from: &str, to: &str) -> &Self {
        let dest = self.path(to);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::rename(self.path(from), dest).unwrap();
        self
    }

    /// Read `rel` as text.
    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel))
            .unwrap_or_else(|_| panic!("Could not read file: {}", self.path(rel).display()))
    }

    /// Lay out a representative Next.js `.next` directory under `prefix`.
    ///
    /// Contains hashed server output plus every kind of volatile file the
    /// default exclusion policy skips.
    pub fn next_build(&self, prefix: &str, build_id: &str) -> &Self {
        let p = |rel: &str| {
            if prefix.is_empty() {
                rel.to_string()
            } else {
                format!("{prefix}/{rel}")
            }
        };
        self.write(&p("BUILD_ID"), build_id)
            .write(&p("build-manifest.json"), "{\"pages\":{}}")
            .write(&p("trace"), "[{\"name\":\"build\"}]")
            .write(&p("cache/webpack/client-production/0.pack"), "cache")
            .write(&p("server/index.html"), "<html>A</html>")
            .write(&p("server/chunks/1.js"), "module.exports=1")
            .write(&p("server/app/page.js"), "page")
            .write(&p("server/pages/_app.js"), "app")
            .write(&p(&format!("static/{build_id}/_buildManifest.js")), "manifest")
            .write(&p("static/chunks/main.js"), "main()")
    }

    /// Assert that `rel` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `rel` does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}
