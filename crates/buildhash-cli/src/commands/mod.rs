//! Command implementations

mod check;
mod files;
mod sync;
mod targets;

pub use check::run_check;
pub use files::run_files;
pub use sync::run_sync;
pub use targets::run_targets;

use std::path::Path;

use buildhash_core::{Config, FingerprintStore, SyncReport, TargetOutcome};
use colored::Colorize;

use crate::error::Result;

/// Load the config for `root` and build a store over it.
pub(crate) fn load_store(root: &Path, config: Option<&Path>) -> Result<FingerprintStore> {
    let config = Config::load(root, config)?;
    Ok(FingerprintStore::from_config(config))
}

/// Print one line per target followed by a summary.
pub(crate) fn print_report(report: &SyncReport) {
    let changed_label = if report.dry_run { "STALE" } else { "UPDATED" };

    for outcome in &report.outcomes {
        match outcome {
            TargetOutcome::Changed(rec) => {
                let previous = match rec.previous_short() {
                    "" => "none",
                    short => short,
                };
                println!(
                    "   {} {} (was {}, now {})",
                    changed_label.yellow().bold(),
                    rec.target.cyan(),
                    previous.dimmed(),
                    rec.current_short()
                );
            }
            TargetOutcome::Unchanged(rec) => {
                println!(
                    "   {} {} ({})",
                    "UNCHANGED".green().bold(),
                    rec.target.cyan(),
                    rec.current_short().dimmed()
                );
            }
            TargetOutcome::Failed(failure) => {
                println!(
                    "   {} {}: {}",
                    "FAILED".red().bold(),
                    failure.target.cyan(),
                    failure.message
                );
            }
        }
    }

    let failed = report.failures().count();
    let changed = report.changed().len();
    let unchanged = report.outcomes.len() - changed - failed;
    println!();
    println!(
        "{} {} changed, {} unchanged, {} failed",
        "=>".blue().bold(),
        changed,
        unchanged,
        failed
    );
}
