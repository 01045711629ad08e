//! Batch run command

use clap::Args;
use stashit_core::errors::ExError;
use stashit_core::logging_facility::{init, init_to_dir, Profile};
use stashit_core::policy::NoopLedgerCommitHook;
use stashit_engine::commands::acceptance::RequiredKeysAcceptance;
use stashit_engine::commands::trigger::OkFileScanner;
use stashit_engine::config::{DEFAULT_REQUIRED_KEYS, DEFAULT_TRIGGER_EXTENSION};
use stashit_engine::{run_pipeline, PipelineDeps, RunSummary, StashConfig};
use stashit_store::errors::io_error;
use stashit_store::TransferMethod;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Staging directory with transfer directories and their trigger files
    #[arg(long, env = "TRANSFER_DIR")]
    pub transfer_dir: PathBuf,

    /// Root of the archive store
    #[arg(long, env = "ARCHIVE_DIR")]
    pub archive_dir: PathBuf,

    /// Directory for the daily transfer log
    #[arg(long, env = "LOGGING_DIR")]
    pub logging_dir: PathBuf,

    /// Ledger database file
    #[arg(long, env = "DATABASE")]
    pub database: PathBuf,

    /// How to copy packages into the archive (rsync or native)
    #[arg(long, env = "TRANSFER_METHOD", default_value = "rsync")]
    pub transfer_method: TransferMethod,

    /// Metadata key every trigger must supply (repeatable)
    #[arg(long = "require", value_name = "KEY")]
    pub required_keys: Vec<String>,

    /// Extension of trigger files
    #[arg(long, default_value = DEFAULT_TRIGGER_EXTENSION)]
    pub trigger_extension: String,

    /// Write JSON log lines instead of human-readable ones
    #[arg(long)]
    pub json_logs: bool,
}

impl RunArgs {
    fn into_config(self) -> StashConfig {
        let mut config = StashConfig::new(
            self.transfer_dir,
            self.archive_dir,
            self.logging_dir,
            self.database,
        );
        config.transfer_method = self.transfer_method;
        config.trigger_extension = self.trigger_extension;
        config.required_metadata_keys = if self.required_keys.is_empty() {
            DEFAULT_REQUIRED_KEYS.iter().map(|k| k.to_string()).collect()
        } else {
            self.required_keys
        };
        config
    }
}

pub fn execute(args: RunArgs) -> Result<(), ExError> {
    let profile = if args.json_logs {
        Profile::Production
    } else {
        Profile::Development
    };
    let config = args.into_config();

    // Before preflight the log directory may be missing; fall back to stderr
    if config.logging_dir.is_dir() {
        let log_file = init_to_dir(profile, &config.logging_dir)
            .map_err(|e| io_error("open_log_file", e).with_path(&config.logging_dir))?;
        tracing::info!(log_file = %log_file.display(), "logging to file");
    } else {
        init(profile);
    }
    tracing::info!(
        transfer_dir = %config.transfer_dir.display(),
        archive_dir = %config.archive_dir.display(),
        transfer_method = %config.transfer_method,
        "configuration loaded"
    );

    config.preflight()?;
    let mut conn = stashit_store::db::open_ledger(&config.database)?;

    let scanner = OkFileScanner::new(&config.transfer_dir, &config.trigger_extension);
    let acceptance = RequiredKeysAcceptance::new(config.required_metadata_keys.clone());
    let transfer = config.transfer_method.build();
    let deps = PipelineDeps {
        transfer: transfer.as_ref(),
        acceptance: &acceptance,
        commit_hook: &NoopLedgerCommitHook,
    };

    let summary = run_pipeline(&config, &scanner, &mut conn, &deps)?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    if summary.discovered == 0 {
        println!("No transfers found");
        return;
    }
    for committed in &summary.committed {
        println!(
            "committed {} as t{} -> {} (transfer {})",
            committed.identity,
            committed.generation,
            committed.destination.display(),
            committed.transfer_id
        );
    }
    for (identity, reason) in &summary.rejected {
        println!("rejected {}: {}", identity, reason);
    }
    for (identity, error) in &summary.failed {
        println!("failed {}: {}", identity, error);
    }
    println!(
        "Run {}: {} discovered, {} committed, {} rejected, {} failed",
        summary.run_id,
        summary.discovered,
        summary.committed.len(),
        summary.rejected.len(),
        summary.failed.len()
    );
}
