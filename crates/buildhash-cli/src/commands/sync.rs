//! Sync command implementation
//!
//! Recomputes every target's fingerprint and rewrites the hash files that
//! changed. Downstream "affected" detection picks up the rewritten files.

use std::path::Path;

use buildhash_core::SyncReport;
use colored::Colorize;

use super::{load_store, print_report};
use crate::error::{CliError, Result};

/// Run the sync command
pub fn run_sync(root: &Path, config: Option<&Path>, json: bool, strict: bool) -> Result<()> {
    let store = load_store(root, config)?;

    if !json {
        println!(
            "{} Updating build hashes for {} target(s)...",
            "=>".blue().bold(),
            store.registry().len()
        );
    }

    let report = store.reconcile_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    check_strict(&report, strict)
}

/// A failed target only fails the process when `strict` is set.
fn check_strict(report: &SyncReport, strict: bool) -> Result<()> {
    let failed = report.failures().count();
    if strict && failed > 0 {
        return Err(CliError::user(format!("{failed} target(s) failed")));
    }
    Ok(())
}
