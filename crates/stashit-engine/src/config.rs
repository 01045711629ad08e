//! Run configuration
//!
//! Built once at process start and passed by reference into the pipeline.

use stashit_core::errors::{ExError, ExErrorKind};
use stashit_store::errors::Result;
use stashit_store::TransferMethod;
use std::path::PathBuf;

/// Metadata keys required when none are configured
pub const DEFAULT_REQUIRED_KEYS: &[&str] = &["Source-Organization"];

/// Extension of trigger files when none is configured
pub const DEFAULT_TRIGGER_EXTENSION: &str = "ok";

#[derive(Debug, Clone)]
pub struct StashConfig {
    /// Staging directory holding candidate directories and their triggers
    pub transfer_dir: PathBuf,
    /// Root of the permanent archive store
    pub archive_dir: PathBuf,
    /// Directory for the daily transfer log
    pub logging_dir: PathBuf,
    /// Ledger database file
    pub database: PathBuf,
    pub transfer_method: TransferMethod,
    pub required_metadata_keys: Vec<String>,
    pub trigger_extension: String,
}

impl StashConfig {
    /// Configuration with default method, required keys and trigger extension
    pub fn new(
        transfer_dir: impl Into<PathBuf>,
        archive_dir: impl Into<PathBuf>,
        logging_dir: impl Into<PathBuf>,
        database: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transfer_dir: transfer_dir.into(),
            archive_dir: archive_dir.into(),
            logging_dir: logging_dir.into(),
            database: database.into(),
            transfer_method: TransferMethod::default(),
            required_metadata_keys: DEFAULT_REQUIRED_KEYS.iter().map(|k| k.to_string()).collect(),
            trigger_extension: DEFAULT_TRIGGER_EXTENSION.to_string(),
        }
    }

    /// Check that the logging, transfer and archive directories exist.
    ///
    /// # Errors
    ///
    /// A single `ExErrorKind::Configuration` error naming every missing
    /// directory.
    pub fn preflight(&self) -> Result<()> {
        let missing: Vec<String> = [
            ("logging", &self.logging_dir),
            ("transfer", &self.transfer_dir),
            ("archive", &self.archive_dir),
        ]
        .into_iter()
        .filter(|(_, dir)| !dir.is_dir())
        .map(|(label, dir)| {
            tracing::error!(
                directory = %dir.display(),
                "{} directory does not exist",
                label
            );
            format!("{} directory {}", label, dir.display())
        })
        .collect();

        if missing.is_empty() {
            return Ok(());
        }
        Err(ExError::new(ExErrorKind::Configuration)
            .with_op("preflight")
            .with_message(format!("missing {}", missing.join(", "))))
    }
}
