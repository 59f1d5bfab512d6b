//! Exclusion policy
//!
//! An ordered list of named rules deciding which relative paths are left out
//! of a fingerprint. Evaluation is a pure function of the relative path and
//! the build marker: no filesystem access, no dependence on walk order. The
//! first matching rule wins, so listings can say *why* a path was skipped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::marker::BuildMarker;

/// A single exclusion rule, matched against a `/`-separated relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExclusionRule {
    /// Path equals the name exactly
    Exact(String),
    /// The directory itself or anything nested below it
    Directory(String),
    /// Path starts with the prefix
    Prefix(String),
    /// Path ends with the suffix, at any depth
    Suffix(String),
    /// Path contains the fragment anywhere.
    ///
    /// Coarse; it overlaps [`ExclusionRule::MarkerPrefix`] and can hide
    /// legitimate changes. Prefer a narrower rule for new entries.
    Contains(String),
    /// Path starts with the prefix followed by the current build marker.
    /// Never matches when the marker is empty.
    MarkerPrefix(String),
}

impl ExclusionRule {
    pub fn matches(&self, relative: &str, marker: &BuildMarker) -> bool {
        match self {
            Self::Exact(name) => relative == name,
            Self::Directory(dir) => {
                relative == dir
                    || relative
                        .strip_prefix(dir.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            Self::Prefix(prefix) => relative.starts_with(prefix.as_str()),
            Self::Suffix(suffix) => relative.ends_with(suffix.as_str()),
            Self::Contains(fragment) => relative.contains(fragment.as_str()),
            Self::MarkerPrefix(prefix) => {
                !marker.is_empty()
                    && relative
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with(marker.as_str()))
            }
        }
    }

    /// The literal value the rule was built from.
    pub fn value(&self) -> &str {
        match self {
            Self::Exact(v)
            | Self::Directory(v)
            | Self::Prefix(v)
            | Self::Suffix(v)
            | Self::Contains(v)
            | Self::MarkerPrefix(v) => v,
        }
    }
}

impl fmt::Display for ExclusionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "exact:{v}"),
            Self::Directory(v) => write!(f, "dir:{v}"),
            Self::Prefix(v) => write!(f, "prefix:{v}"),
            Self::Suffix(v) => write!(f, "suffix:{v}"),
            Self::Contains(v) => write!(f, "contains:{v}"),
            Self::MarkerPrefix(v) => write!(f, "marker:{v}<BUILD_ID>"),
        }
    }
}

/// Ordered set of exclusion rules shared by every target of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionPolicy {
    rules: Vec<ExclusionRule>,
}

impl ExclusionPolicy {
    pub fn new(rules: Vec<ExclusionRule>) -> Self {
        Self { rules }
    }

    /// A policy that excludes nothing.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Rules for a Next.js `.next` output directory.
    ///
    /// Skips the incremental cache, dev server output, trace files, JSON
    /// manifests, per-route server output and marker-named static chunks.
    pub fn next_build() -> Self {
        use ExclusionRule::*;
        Self::new(vec![
            Directory("cache".into()),
            Directory("dev".into()),
            Exact("BUILD_ID".into()),
            Exact("trace".into()),
            Exact("trace-build".into()),
            Suffix(".json".into()),
            Prefix("server/pages/".into()),
            Prefix("server/app/".into()),
            MarkerPrefix("static/".into()),
            Contains(".next/static".into()),
        ])
    }

    pub fn rules(&self) -> &[ExclusionRule] {
        &self.rules
    }

    pub fn push(&mut self, rule: ExclusionRule) {
        self.rules.push(rule);
    }

    pub fn with_rule(mut self, rule: ExclusionRule) -> Self {
        self.push(rule);
        self
    }

    /// The first rule excluding `relative`, if any.
    pub fn first_match(&self, relative: &str, marker: &BuildMarker) -> Option<&ExclusionRule> {
        self.rules.iter().find(|rule| rule.matches(relative, marker))
    }

    pub fn is_excluded(&self, relative: &str, marker: &BuildMarker) -> bool {
        self.first_match(relative, marker).is_some()
    }
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::next_build()
    }
}
