//! Per-target reconciliation results
//!
//! Every target ends up in exactly one [`TargetOutcome`]. Failed targets are
//! never part of the changed set.

use buildhash_fs::Digest;
use buildhash_fs::checksum::short_digest;
use serde::Serialize;

use crate::Error;

/// Comparison of a freshly computed digest against the persisted one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub target: String,
    /// Raw persisted text, empty when nothing was persisted yet
    pub previous: String,
    pub current: Digest,
    pub changed: bool,
}

impl Reconciliation {
    pub fn previous_short(&self) -> &str {
        short_digest(&self.previous)
    }

    pub fn current_short(&self) -> &str {
        self.current.short()
    }
}

/// Which side of reconciliation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Walking or reading the source tree
    Read,
    /// Writing the new digest
    Persist,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
    pub target: String,
    pub kind: FailureKind,
    pub message: String,
}

/// How one target came out of a sync or check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetOutcome {
    Changed(Reconciliation),
    Unchanged(Reconciliation),
    Failed(TargetFailure),
}

impl TargetOutcome {
    pub fn from_result(target: &str, result: Result<Reconciliation, Error>) -> Self {
        match result {
            Ok(rec) if rec.changed => Self::Changed(rec),
            Ok(rec) => Self::Unchanged(rec),
            Err(e) => Self::Failed(TargetFailure {
                target: target.to_string(),
                kind: if e.is_persist() {
                    FailureKind::Persist
                } else {
                    FailureKind::Read
                },
                message: e.to_string(),
            }),
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Self::Changed(rec) | Self::Unchanged(rec) => &rec.target,
            Self::Failed(failure) => &failure.target,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcomes of one pass over every registered target, in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Nothing was written
    pub dry_run: bool,
    pub outcomes: Vec<TargetOutcome>,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: TargetOutcome) {
        self.outcomes.push(outcome);
    }

    /// Ids of targets whose fingerprint changed.
    pub fn changed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_changed())
            .map(TargetOutcome::target)
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TargetFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            TargetOutcome::Failed(failure) => Some(failure),
            _ => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(TargetOutcome::is_failed)
    }
}
