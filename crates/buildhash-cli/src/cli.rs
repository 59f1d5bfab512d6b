//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// buildhash - Fingerprint build output and record when it changes
#[derive(Parser, Debug)]
#[command(name = "buildhash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace root that target paths are relative to
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Config file (relative to the root); defaults to buildhash.toml
    #[arg(short, long, global = true, env = "BUILDHASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Recompute every target's fingerprint and persist the ones that changed
    ///
    /// Runs between "build affected" and "test affected" in CI. Exits 0 once
    /// every target has been processed, even if some failed.
    ///
    /// Examples:
    ///   buildhash sync             # Update build.hash files
    ///   buildhash sync --json      # Machine-readable report
    ///   buildhash sync --strict    # Exit 1 if any target failed
    Sync {
        /// Output as JSON for CI/CD integration
        #[arg(long)]
        json: bool,

        /// Exit with an error when any target fails
        #[arg(long)]
        strict: bool,
    },

    /// Report which fingerprints would change, without writing anything
    Check {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List the files that make up a target's fingerprint, in hash order
    Files {
        /// Target id (see 'buildhash targets')
        target: String,

        /// Also list excluded paths and the rule that excluded them
        #[arg(long)]
        excluded: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show the configured targets
    Targets,
}
