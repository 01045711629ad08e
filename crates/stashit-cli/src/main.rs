//! stashit CLI
//!
//! Batch ingest of staged transfers into the archive, and ledger history.
//!
//! Exit codes: 0 when the run completes (skipped candidates included),
//! 2 for a run-level error, 1 for any other failure.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "stashit-cli")]
#[command(about = "stashit - package, deduplicate and archive staged transfers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Process every staged transfer once
    Run(commands::run::RunArgs),
    /// Show recorded transfers
    History(commands::history::HistoryArgs),
}

fn main() -> ExitCode {
    // A missing .env is fine; flags and the real environment still apply
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::History(args) => commands::history::execute(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_fatal() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
