//! buildhash CLI
//!
//! Fingerprints build-output trees and records when they meaningfully change.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!("Verbose mode enabled");
        }
    }

    let config = cli.config.as_deref();
    match cli.command {
        Some(cmd) => execute_command(cmd, &cli.root, config),
        None => {
            // No command provided - show help hint
            println!(
                "{} build output fingerprinting",
                "buildhash".green().bold()
            );
            println!();
            println!("Run {} for available commands.", "buildhash --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(
    cmd: Commands,
    root: &std::path::Path,
    config: Option<&std::path::Path>,
) -> Result<()> {
    match cmd {
        Commands::Sync { json, strict } => commands::run_sync(root, config, json, strict),
        Commands::Check { json } => commands::run_check(root, config, json),
        Commands::Files {
            target,
            excluded,
            json,
        } => commands::run_files(root, config, &target, excluded, json),
        Commands::Targets => commands::run_targets(root, config),
    }
}
