//! Files command implementation
//!
//! Shows exactly which files feed a target's fingerprint, which is the first
//! thing to look at when a hash flips without a visible reason.

use std::path::Path;

use buildhash_core::Config;
use colored::Colorize;

use crate::error::Result;

/// Run the files command
pub fn run_files(
    root: &Path,
    config: Option<&Path>,
    target: &str,
    excluded: bool,
    json: bool,
) -> Result<()> {
    let config = Config::load(root, config)?;
    let target = config.registry.get(target)?;
    let listing = config.fingerprinter.list(&target.source_dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if listing.missing {
        println!(
            "{} {} does not exist (fingerprint: {})",
            "!".yellow().bold(),
            target.source_dir.display(),
            "missing".yellow()
        );
        return Ok(());
    }

    if listing.marker.is_empty() {
        println!("{}: {}", "Marker".dimmed(), "none".dimmed());
    } else {
        println!("{}: {}", "Marker".dimmed(), listing.marker.cyan());
    }
    println!();

    for path in &listing.included {
        println!("{path}");
    }

    if excluded {
        println!();
        println!("{} ({}):", "Excluded".bold(), listing.excluded.len());
        for entry in &listing.excluded {
            println!("  {} {} ({})", "-".red(), entry.path, entry.rule.dimmed());
        }
    }

    println!();
    println!(
        "{} {} file(s) hashed, {} path(s) excluded",
        "=>".blue().bold(),
        listing.included.len(),
        listing.excluded.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildhash_test_utils::TestTree;

    #[test]
    fn test_files_for_builtin_target() {
        let tree = TestTree::new();
        tree.next_build("apps/web/.next", "abc123");

        assert!(run_files(tree.root(), None, "packages/web-e2e", true, false).is_ok());
        assert!(run_files(tree.root(), None, "packages/web-e2e", false, true).is_ok());
    }

    #[test]
    fn test_files_missing_source_is_ok() {
        let tree = TestTree::new();
        assert!(run_files(tree.root(), None, "packages/docs-e2e", false, false).is_ok());
    }

    #[test]
    fn test_files_unknown_target() {
        let tree = TestTree::new();
        let err = run_files(tree.root(), None, "packages/nope", false, false).unwrap_err();
        assert!(err.to_string().contains("packages/nope"));
    }
}
