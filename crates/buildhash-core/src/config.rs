//! Target registry and `buildhash.toml` parsing
//!
//! The registry maps each target id to the build-output directory it
//! fingerprints and the file its last digest is persisted to. It is built
//! once, from the manifest or the built-in defaults, and never changes
//! afterwards.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprinter;
use crate::marker::DEFAULT_MARKER_FILE;
use crate::policy::{ExclusionPolicy, ExclusionRule};
use crate::{Error, Result};

/// Default manifest file name, looked up in the workspace root.
pub const CONFIG_FILE: &str = "buildhash.toml";

/// Hash file name used by the built-in registry.
const DEFAULT_HASH_FILE: &str = "build.hash";

/// `(consumer package, app)` pairs of the built-in registry. Each consumer
/// tracks the `.next` output of its app.
const BUILTIN_TARGETS: &[(&str, &str)] = &[
    ("packages/web-e2e", "apps/web"),
    ("packages/docs-e2e", "apps/docs"),
];

fn default_marker_file() -> String {
    DEFAULT_MARKER_FILE.to_string()
}

fn default_true() -> bool {
    true
}

/// One thing to fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FingerprintTarget {
    /// Opaque key, e.g. the consuming test package
    pub id: String,
    /// Absolute path of the tree to hash; may not exist
    pub source_dir: PathBuf,
    /// Absolute path of the single-line persisted digest
    pub hash_file: PathBuf,
}

/// Immutable, ordered id → target mapping.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: Vec<FingerprintTarget>,
}

impl TargetRegistry {
    /// Build a registry, rejecting empty or duplicate ids and hash files
    /// claimed by more than one target.
    pub fn new(targets: Vec<FingerprintTarget>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut owners: HashMap<&Path, &str> = HashMap::new();
        for target in &targets {
            if target.id.trim().is_empty() {
                return Err(Error::InvalidConfig {
                    message: "target id must not be empty".into(),
                });
            }
            if !seen.insert(target.id.as_str()) {
                return Err(Error::InvalidConfig {
                    message: format!("duplicate target id '{}'", target.id),
                });
            }
            if let Some(owner) = owners.insert(&target.hash_file, &target.id) {
                return Err(Error::InvalidConfig {
                    message: format!(
                        "hash file {} shared by targets '{}' and '{}'",
                        target.hash_file.display(),
                        owner,
                        target.id
                    ),
                });
            }
        }
        Ok(Self { targets })
    }

    /// The registry used when no manifest exists.
    pub fn builtin(root: &Path) -> Self {
        let targets = BUILTIN_TARGETS
            .iter()
            .map(|(consumer, app)| FingerprintTarget {
                id: (*consumer).to_string(),
                source_dir: root.join(app).join(".next"),
                hash_file: root.join(consumer).join(DEFAULT_HASH_FILE),
            })
            .collect();
        Self { targets }
    }

    pub fn get(&self, id: &str) -> Result<&FingerprintTarget> {
        self.targets
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::UnknownTarget { id: id.to_string() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &FingerprintTarget> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A `[[targets]]` entry as written in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    pub id: String,
    pub source_dir: PathBuf,
    pub hash_file: PathBuf,
}

/// The `[exclude]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludeSection {
    /// Start from the built-in `.next` rules
    #[serde(default = "default_true")]
    pub defaults: bool,
    #[serde(default)]
    pub exact: Vec<String>,
    #[serde(default)]
    pub directories: Vec<String>,
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub suffixes: Vec<String>,
    #[serde(default)]
    pub contains: Vec<String>,
    /// Prefixes combined with the build marker
    #[serde(default)]
    pub marker_prefixes: Vec<String>,
}

impl Default for ExcludeSection {
    fn default() -> Self {
        Self {
            defaults: true,
            exact: Vec::new(),
            directories: Vec::new(),
            prefixes: Vec::new(),
            suffixes: Vec::new(),
            contains: Vec::new(),
            marker_prefixes: Vec::new(),
        }
    }
}

impl ExcludeSection {
    /// Defaults first (if enabled), then extra rules grouped by kind.
    pub fn to_policy(&self) -> Result<ExclusionPolicy> {
        let mut policy = if self.defaults {
            ExclusionPolicy::next_build()
        } else {
            ExclusionPolicy::empty()
        };

        let groups: [(&[String], fn(String) -> ExclusionRule); 6] = [
            (self.exact.as_slice(), ExclusionRule::Exact),
            (self.directories.as_slice(), ExclusionRule::Directory),
            (self.prefixes.as_slice(), ExclusionRule::Prefix),
            (self.suffixes.as_slice(), ExclusionRule::Suffix),
            (self.contains.as_slice(), ExclusionRule::Contains),
            (self.marker_prefixes.as_slice(), ExclusionRule::MarkerPrefix),
        ];
        for (values, make) in groups {
            for value in values {
                // An empty pattern would exclude everything
                if value.is_empty() {
                    return Err(Error::InvalidConfig {
                        message: "exclusion rules must not be empty".into(),
                    });
                }
                policy.push(make(value.clone()));
            }
        }
        Ok(policy)
    }
}

/// Parsed `buildhash.toml`.
///
/// ```
/// use buildhash_core::config::Manifest;
///
/// let manifest = Manifest::parse(r#"
/// [[targets]]
/// id = "packages/web-e2e"
/// source_dir = "apps/web/.next"
/// hash_file = "packages/web-e2e/build.hash"
/// "#).unwrap();
///
/// assert_eq!(manifest.targets.len(), 1);
/// assert_eq!(manifest.marker_file, "BUILD_ID");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Marker file read from inside each source tree
    #[serde(default = "default_marker_file")]
    pub marker_file: String,

    #[serde(default)]
    pub exclude: ExcludeSection,

    #[serde(default)]
    pub targets: Vec<TargetEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            marker_file: default_marker_file(),
            exclude: ExcludeSection::default(),
            targets: Vec::new(),
        }
    }
}

impl Manifest {
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        Ok(manifest)
    }

    /// Load a manifest, attributing parse failures to `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = buildhash_fs::io::read_text(path)?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve target paths against `root`. An empty target list falls back
    /// to the built-in registry.
    pub fn registry(&self, root: &Path) -> Result<TargetRegistry> {
        if self.targets.is_empty() {
            return Ok(TargetRegistry::builtin(root));
        }
        let targets = self
            .targets
            .iter()
            .map(|entry| FingerprintTarget {
                id: entry.id.clone(),
                source_dir: root.join(&entry.source_dir),
                hash_file: root.join(&entry.hash_file),
            })
            .collect();
        TargetRegistry::new(targets)
    }
}

/// Everything a store needs, resolved against a workspace root.
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    /// Manifest the config was loaded from, `None` for built-in defaults
    pub source: Option<PathBuf>,
    pub registry: TargetRegistry,
    pub fingerprinter: Fingerprinter,
}

impl Config {
    /// Load configuration for `root`.
    ///
    /// An explicit `config_path` must exist. Otherwise `<root>/buildhash.toml`
    /// is used when present, and the built-in defaults when not.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let root = dunce::canonicalize(root).map_err(|e| buildhash_fs::Error::io(root, e))?;

        let source = match config_path {
            Some(path) => Some(root.join(path)),
            None => Some(root.join(CONFIG_FILE)).filter(|p| p.is_file()),
        };

        let manifest = match &source {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Manifest::load(path)?
            }
            None => {
                tracing::debug!("No {} in {}, using defaults", CONFIG_FILE, root.display());
                Manifest::default()
            }
        };

        Self::from_manifest(root, source, &manifest)
    }

    pub fn from_manifest(root: PathBuf, source: Option<PathBuf>, manifest: &Manifest) -> Result<Self> {
        if manifest.marker_file.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "marker_file must not be empty".into(),
            });
        }
        let registry = manifest.registry(&root)?;
        let policy = manifest.exclude.to_policy()?;
        Ok(Self {
            fingerprinter: Fingerprinter::new(policy, manifest.marker_file.clone()),
            registry,
            source,
            root,
        })
    }
}
