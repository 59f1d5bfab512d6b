//! Targets command implementation

use std::path::Path;

use buildhash_core::Config;
use buildhash_core::store::read_persisted;
use buildhash_fs::checksum::short_digest;
use colored::Colorize;

use crate::error::Result;

/// Run the targets command
pub fn run_targets(root: &Path, config: Option<&Path>) -> Result<()> {
    let config = Config::load(root, config)?;
    let relative = |path: &Path| {
        path.strip_prefix(&config.root)
            .unwrap_or(path)
            .display()
            .to_string()
    };

    println!("{}", "Fingerprint Targets".bold());
    println!();
    println!("{}:   {}", "Root".dimmed(), config.root.display());
    match &config.source {
        Some(source) => println!("{}: {}", "Config".dimmed(), relative(source)),
        None => println!("{}: {}", "Config".dimmed(), "built-in defaults".dimmed()),
    }
    println!("{}: {}", "Marker".dimmed(), config.fingerprinter.marker_file());
    println!();

    for target in config.registry.iter() {
        let persisted = read_persisted(&target.hash_file);
        let recorded = if persisted.is_empty() {
            "none".dimmed()
        } else {
            short_digest(&persisted).normal()
        };
        println!("  {} {}", "+".green(), target.id.cyan());
        println!("      {}:    {}", "source".dimmed(), relative(&target.source_dir));
        println!("      {}: {}", "hash file".dimmed(), relative(&target.hash_file));
        println!("      {}:  {}", "recorded".dimmed(), recorded);
    }

    Ok(())
}
