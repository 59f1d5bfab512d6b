//! Directory fingerprinting
//!
//! Walks a build-output tree in canonical order, skips excluded paths (and
//! whole excluded subtrees), and folds each remaining file's relative path
//! followed by its content into a single SHA-256. Directories contribute no
//! bytes, so empty directories are invisible. A tree that does not exist
//! fingerprints to the `missing` sentinel.
//!
//! Nothing here writes to the filesystem.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use buildhash_fs::{Digest, DigestAccumulator, EntryKind, TreeWalker, WalkEntry, io};
use serde::Serialize;

use crate::marker::{BuildMarker, DEFAULT_MARKER_FILE};
use crate::policy::{ExclusionPolicy, ExclusionRule};
use crate::{Error, Result};

/// Fingerprint `source_dir` under `policy`, with `marker` feeding the
/// marker-dependent rules.
pub fn fingerprint(
    source_dir: &Path,
    policy: &ExclusionPolicy,
    marker: &BuildMarker,
) -> Result<Digest> {
    fingerprint_with(source_dir, |relative| policy.is_excluded(relative, marker))
}

/// Fingerprint `source_dir`, skipping every relative path `exclude` accepts.
pub fn fingerprint_with(source_dir: &Path, mut exclude: impl FnMut(&str) -> bool) -> Result<Digest> {
    if !source_exists(source_dir)? {
        tracing::debug!("Source tree {} is absent", source_dir.display());
        return Ok(Digest::Missing);
    }

    let mut acc = DigestAccumulator::new();
    let mut files = 0usize;
    let mut bytes = 0u64;

    walk_tree(
        source_dir,
        |relative| exclude(relative).then_some(()),
        |visit| {
            if let Visit::Included(entry) = visit {
                if entry.kind == EntryKind::File {
                    bytes += hash_file(source_dir, entry, &mut acc)?;
                    files += 1;
                }
            }
            Ok(())
        },
    )?;

    let digest = acc.finish();
    tracing::debug!(
        "Fingerprinted {} ({} files, {} bytes): {}",
        source_dir.display(),
        files,
        bytes,
        digest.short()
    );
    Ok(digest)
}

fn hash_file(source_dir: &Path, entry: &WalkEntry, acc: &mut DigestAccumulator) -> Result<u64> {
    let fail = |source: buildhash_fs::Error| Error::Fingerprint {
        dir: source_dir.to_path_buf(),
        source,
    };

    let mut file = io::open(&entry.path).map_err(fail)?;
    acc.update_path(entry.relative.as_str());
    acc.update_reader(&mut file)
        .map_err(|e| fail(buildhash_fs::Error::io(&entry.path, e)))
}

/// `Ok(false)` only for a genuinely absent tree; anything else unexpected is
/// an error rather than a silently wrong digest.
fn source_exists(source_dir: &Path) -> Result<bool> {
    let fail = |e: std::io::Error| Error::Fingerprint {
        dir: source_dir.to_path_buf(),
        source: buildhash_fs::Error::io(source_dir, e),
    };
    match fs::metadata(source_dir) {
        Ok(meta) if meta.is_dir() => Ok(true),
        Ok(_) => Err(fail(std::io::Error::from(ErrorKind::NotADirectory))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(fail(e)),
    }
}

enum Visit<'a, R> {
    Included(&'a WalkEntry),
    Excluded(&'a WalkEntry, R),
}

/// Drive one sorted walk, classifying each entry exactly once.
///
/// `classify` returns `Some(reason)` to exclude an entry; excluded
/// directories are pruned.
fn walk_tree<R>(
    source_dir: &Path,
    mut classify: impl FnMut(&str) -> Option<R>,
    mut visit: impl FnMut(Visit<'_, R>) -> Result<()>,
) -> Result<()> {
    let mut walker = TreeWalker::new(source_dir);
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|source| Error::Fingerprint {
            dir: source_dir.to_path_buf(),
            source,
        })?;

        match classify(entry.relative.as_str()) {
            Some(reason) => {
                if entry.kind == EntryKind::Dir {
                    walker.skip_subtree();
                }
                visit(Visit::Excluded(&entry, reason))?;
            }
            None => visit(Visit::Included(&entry))?,
        }
    }
    Ok(())
}

/// A path left out of the fingerprint and the rule responsible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedPath {
    pub path: String,
    pub rule: String,
}

/// What a fingerprint of one tree is made of.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing {
    /// The source tree does not exist
    pub missing: bool,
    /// Build marker in effect, empty when none was found
    pub marker: String,
    /// Hashed files in hash order
    pub included: Vec<String>,
    /// Excluded entries in walk order; excluded directories appear once
    pub excluded: Vec<ExcludedPath>,
}

/// Policy plus marker-file location: everything needed to fingerprint a
/// tree the same way every time.
///
/// The marker file itself is always excluded, whatever the policy says, so a
/// new build id alone never changes the digest.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    policy: ExclusionPolicy,
    marker_file: String,
    marker_rule: ExclusionRule,
}

impl Fingerprinter {
    pub fn new(policy: ExclusionPolicy, marker_file: impl Into<String>) -> Self {
        let marker_file = marker_file.into();
        Self {
            policy,
            marker_rule: ExclusionRule::Exact(marker_file.clone()),
            marker_file,
        }
    }

    pub fn policy(&self) -> &ExclusionPolicy {
        &self.policy
    }

    pub fn marker_file(&self) -> &str {
        &self.marker_file
    }

    pub fn read_marker(&self, source_dir: &Path) -> BuildMarker {
        BuildMarker::read(source_dir, &self.marker_file)
    }

    fn first_match(&self, relative: &str, marker: &BuildMarker) -> Option<&ExclusionRule> {
        if self.marker_rule.matches(relative, marker) {
            return Some(&self.marker_rule);
        }
        self.policy.first_match(relative, marker)
    }

    /// Read the build marker, then fingerprint `source_dir`.
    pub fn fingerprint(&self, source_dir: &Path) -> Result<Digest> {
        let marker = self.read_marker(source_dir);
        fingerprint_with(source_dir, |relative| {
            self.first_match(relative, &marker).is_some()
        })
    }

    /// Walk `source_dir` exactly as [`Fingerprinter::fingerprint`] would and
    /// report what gets hashed and what gets skipped.
    pub fn list(&self, source_dir: &Path) -> Result<Listing> {
        if !source_exists(source_dir)? {
            return Ok(Listing {
                missing: true,
                ..Listing::default()
            });
        }

        let marker = self.read_marker(source_dir);
        let mut listing = Listing {
            marker: marker.as_str().to_string(),
            ..Listing::default()
        };

        walk_tree(
            source_dir,
            |relative| self.first_match(relative, &marker),
            |visit| {
                match visit {
                    Visit::Included(entry) if entry.kind == EntryKind::File => {
                        listing.included.push(entry.relative.to_string());
                    }
                    Visit::Included(_) => {}
                    Visit::Excluded(entry, rule) => listing.excluded.push(ExcludedPath {
                        path: entry.relative.to_string(),
                        rule: rule.to_string(),
                    }),
                }
                Ok(())
            },
        )?;

        Ok(listing)
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new(ExclusionPolicy::next_build(), DEFAULT_MARKER_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ExclusionRule;
    use std::fs;
    use tempfile::TempDir;

    fn sha256_of(parts: &[&[u8]]) -> String {
        let mut acc = DigestAccumulator::new();
        for part in parts {
            acc.update_bytes(part);
        }
        acc.finish().as_str().to_string()
    }

    #[test]
    fn missing_tree_is_sentinel() {
        let temp = TempDir::new().unwrap();
        let digest = Fingerprinter::default()
            .fingerprint(&temp.path().join("absent"))
            .unwrap();
        assert_eq!(digest, Digest::Missing);
        assert_eq!(digest.as_str(), "missing");
    }

    #[test]
    fn source_that_is_a_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("not-a-dir");
        fs::write(&file, "x").unwrap();

        let err = Fingerprinter::default().fingerprint(&file).unwrap_err();
        assert!(matches!(err, Error::Fingerprint { .. }));
    }

    #[test]
    fn digest_is_path_then_content_per_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("server")).unwrap();
        fs::write(temp.path().join("server/index.html"), "A").unwrap();
        fs::write(temp.path().join("z.js"), "Z").unwrap();

        let digest = fingerprint_with(temp.path(), |_| false).unwrap();
        let expected = sha256_of(&[b"server/index.html", b"A", b"z.js", b"Z"]);
        assert_eq!(digest.as_str(), expected);
    }

    #[test]
    fn empty_tree_hashes_nothing() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b/c")).unwrap();

        let digest = fingerprint_with(temp.path(), |_| false).unwrap();
        assert_eq!(digest.as_str(), sha256_of(&[]));
    }

    #[test]
    fn excluded_directory_is_not_descended() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("cache/deep")).unwrap();
        fs::write(temp.path().join("cache/deep/x"), "x").unwrap();

        let mut asked = Vec::new();
        fingerprint_with(temp.path(), |rel| {
            asked.push(rel.to_string());
            rel == "cache"
        })
        .unwrap();
        assert_eq!(asked, vec!["cache"]);
    }

    #[test]
    fn list_reports_included_and_excluded() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("BUILD_ID"), "abc123").unwrap();
        fs::create_dir_all(temp.path().join("cache")).unwrap();
        fs::write(temp.path().join("cache/tmp.bin"), "X").unwrap();
        fs::create_dir_all(temp.path().join("server")).unwrap();
        fs::write(temp.path().join("server/index.html"), "A").unwrap();

        let listing = Fingerprinter::default().list(temp.path()).unwrap();
        assert!(!listing.missing);
        assert_eq!(listing.marker, "abc123");
        assert_eq!(listing.included, vec!["server/index.html"]);
        assert_eq!(
            listing.excluded,
            vec![
                ExcludedPath {
                    path: "BUILD_ID".into(),
                    rule: "exact:BUILD_ID".into()
                },
                ExcludedPath {
                    path: "cache".into(),
                    rule: "dir:cache".into()
                },
            ]
        );
    }

    #[test]
    fn list_of_missing_tree() {
        let temp = TempDir::new().unwrap();
        let listing = Fingerprinter::default()
            .list(&temp.path().join("absent"))
            .unwrap();
        assert!(listing.missing);
        assert!(listing.included.is_empty());
    }

    #[test]
    fn custom_marker_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("BUILD_REV"), "r42").unwrap();
        fs::create_dir_all(temp.path().join("assets/r42")).unwrap();
        fs::write(temp.path().join("assets/r42/a.js"), "a").unwrap();

        let policy = ExclusionPolicy::empty()
            .with_rule(ExclusionRule::Exact("BUILD_REV".into()))
            .with_rule(ExclusionRule::MarkerPrefix("assets/".into()));
        let fp = Fingerprinter::new(policy, "BUILD_REV");

        assert_eq!(fp.read_marker(temp.path()).as_str(), "r42");
        assert_eq!(fp.fingerprint(temp.path()).unwrap().as_str(), sha256_of(&[]));
    }

    #[test]
    fn marker_file_is_excluded_without_a_policy_rule() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("BUILD_REV"), "r1").unwrap();
        fs::write(temp.path().join("index.html"), "A").unwrap();

        let fp = Fingerprinter::new(ExclusionPolicy::empty(), "BUILD_REV");
        let listing = fp.list(temp.path()).unwrap();

        assert_eq!(listing.included, vec!["index.html"]);
        assert_eq!(listing.excluded[0].rule, "exact:BUILD_REV");
        assert_eq!(
            fp.fingerprint(temp.path()).unwrap().as_str(),
            sha256_of(&[b"index.html", b"A"])
        );
    }
}
