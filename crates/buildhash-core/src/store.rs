//! Fingerprint store
//!
//! Owns the persisted hash file of every registered target. A reconcile
//! computes the current digest, compares it with the persisted text and
//! rewrites the file only when they differ. The digest is only written after
//! a complete traversal, so a failed walk never leaves a partial value
//! behind.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use buildhash_fs::io;

use crate::config::{Config, FingerprintTarget, TargetRegistry};
use crate::fingerprint::Fingerprinter;
use crate::report::{Reconciliation, SyncReport, TargetOutcome};
use crate::{Error, Result};

/// Read the persisted digest text. Absent or unreadable reads as empty.
pub fn read_persisted(hash_file: &Path) -> String {
    match fs::read_to_string(hash_file) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No persisted digest at {}", hash_file.display());
            String::new()
        }
        Err(e) => {
            tracing::warn!(
                "Could not read {}, treating as empty: {}",
                hash_file.display(),
                e
            );
            String::new()
        }
    }
}

/// Registry plus fingerprinter, fixed at construction.
#[derive(Debug, Clone)]
pub struct FingerprintStore {
    registry: TargetRegistry,
    fingerprinter: Fingerprinter,
}

impl FingerprintStore {
    pub fn new(registry: TargetRegistry, fingerprinter: Fingerprinter) -> Self {
        Self {
            registry,
            fingerprinter,
        }
    }

    pub fn from_config(config: Config) -> Self {
        Self::new(config.registry, config.fingerprinter)
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn fingerprinter(&self) -> &Fingerprinter {
        &self.fingerprinter
    }

    /// Compare and, on change, persist the new digest for `target`.
    pub fn reconcile(&self, target: &FingerprintTarget) -> Result<Reconciliation> {
        let rec = self.compare(target)?;

        if rec.changed {
            io::write_text(&target.hash_file, rec.current.as_str()).map_err(|source| {
                Error::Persist {
                    path: target.hash_file.clone(),
                    source,
                }
            })?;
            tracing::info!(
                "Updated hash for {} (was {}, now {})",
                target.id,
                rec.previous_short(),
                rec.current_short()
            );
        } else {
            tracing::info!("Hash matched for {} ({})", target.id, rec.current_short());
        }

        Ok(rec)
    }

    /// Compare without writing anything.
    pub fn inspect(&self, target: &FingerprintTarget) -> Result<Reconciliation> {
        self.compare(target)
    }

    fn compare(&self, target: &FingerprintTarget) -> Result<Reconciliation> {
        let current = self.fingerprinter.fingerprint(&target.source_dir)?;
        let previous = read_persisted(&target.hash_file);
        let changed = !current.matches(&previous);

        Ok(Reconciliation {
            target: target.id.clone(),
            previous,
            current,
            changed,
        })
    }

    /// Reconcile every target. One target failing never stops the rest.
    pub fn reconcile_all(&self) -> SyncReport {
        self.each_target(false, |target| self.reconcile(target))
    }

    /// Inspect every target without writing.
    pub fn inspect_all(&self) -> SyncReport {
        self.each_target(true, |target| self.inspect(target))
    }

    fn each_target(
        &self,
        dry_run: bool,
        mut run: impl FnMut(&FingerprintTarget) -> Result<Reconciliation>,
    ) -> SyncReport {
        let mut report = SyncReport::new(dry_run);
        for target in self.registry.iter() {
            let result = run(target);
            if let Err(e) = &result {
                tracing::warn!("Target {} failed: {}", target.id, e);
            }
            report.push(TargetOutcome::from_result(&target.id, result));
        }
        report
    }
}
