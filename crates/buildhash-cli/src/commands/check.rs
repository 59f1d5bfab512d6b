//! Check command implementation

use std::path::Path;

use colored::Colorize;

use super::{load_store, print_report};
use crate::error::Result;

/// Run the check command
///
/// Reports what `sync` would change. Never writes, and never fails because
/// a target is stale or unreadable.
pub fn run_check(root: &Path, config: Option<&Path>, json: bool) -> Result<()> {
    let store = load_store(root, config)?;

    if !json {
        println!(
            "{} Checking build hashes for {} target(s)...",
            "=>".blue().bold(),
            store.registry().len()
        );
    }

    let report = store.inspect_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}
