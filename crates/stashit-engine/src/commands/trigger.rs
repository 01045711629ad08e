//! Trigger scanning
//!
//! An upstream process stages a candidate directory `<transfer_dir>/<name>`
//! and, once it is complete, drops a trigger file `<transfer_dir>/<name>.ok`
//! whose body is `Key: Value` descriptive metadata. A committed candidate's
//! trigger is renamed to `<name>.ok.done`.

use stashit_core::errors::{ExError, ExErrorKind};
use stashit_core::model::{Identity, InfoMap};
use stashit_core_types::schema::EVENT_SKIPPED;
use stashit_store::errors::{io_error, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended to a trigger once its candidate is committed
pub const DONE_SUFFIX: &str = ".done";

/// A staged directory ready for ingest
#[derive(Debug, Clone)]
pub struct Candidate {
    pub identity: Identity,
    pub source_dir: PathBuf,
    pub metadata: InfoMap,
    pub trigger_path: PathBuf,
}

/// Source of candidates for one run
pub trait TriggerScanner {
    /// Candidates in processing order. The sequence is single-pass.
    ///
    /// # Errors
    ///
    /// Fails only if the staging location cannot be listed at all.
    fn scan(&self) -> Result<Box<dyn Iterator<Item = Candidate> + '_>>;

    /// Mark a candidate as done so later runs skip it.
    ///
    /// # Errors
    ///
    /// The marker could not be updated.
    fn complete(&self, candidate: &Candidate) -> Result<()>;
}

/// Scans a transfer directory for `<name>.<extension>` trigger files
#[derive(Debug, Clone)]
pub struct OkFileScanner {
    transfer_dir: PathBuf,
    extension: String,
}

impl OkFileScanner {
    pub fn new(transfer_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            transfer_dir: transfer_dir.into(),
            extension: extension.into(),
        }
    }

    /// Trigger files sorted by name
    fn trigger_files(&self) -> Result<Vec<PathBuf>> {
        let listing = fs::read_dir(&self.transfer_dir)
            .map_err(|e| io_error("scan_triggers", e).with_path(&self.transfer_dir))?;

        let mut triggers = Vec::new();
        for entry in listing {
            let entry =
                entry.map_err(|e| io_error("scan_triggers", e).with_path(&self.transfer_dir))?;
            let path = entry.path();
            if path.is_file() && path.extension() == Some(OsStr::new(&self.extension)) {
                triggers.push(path);
            }
        }
        triggers.sort();
        Ok(triggers)
    }

    fn read_candidate(&self, trigger: &Path) -> std::result::Result<Candidate, ExError> {
        let invalid = |message: String| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("read_trigger")
                .with_path(trigger)
                .with_message(message)
        };

        let name = trigger
            .file_stem()
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| invalid("trigger file has no name".to_string()))?;
        let source_dir = self.transfer_dir.join(name);
        if !source_dir.is_dir() {
            return Err(invalid(format!(
                "no transfer directory {}",
                source_dir.display()
            )));
        }

        let identity = Identity::from_dir(&source_dir)?;
        let body = fs::read_to_string(trigger)
            .map_err(|e| io_error("read_trigger", e).with_path(trigger))?;
        let metadata = InfoMap::parse(&body)?;

        Ok(Candidate {
            identity,
            source_dir,
            metadata,
            trigger_path: trigger.to_path_buf(),
        })
    }
}

impl TriggerScanner for OkFileScanner {
    fn scan(&self) -> Result<Box<dyn Iterator<Item = Candidate> + '_>> {
        let triggers = self.trigger_files()?;
        tracing::debug!(
            transfer_dir = %self.transfer_dir.display(),
            triggers = triggers.len(),
            "Found trigger files"
        );

        Ok(Box::new(triggers.into_iter().filter_map(move |trigger| {
            match self.read_candidate(&trigger) {
                Ok(candidate) => Some(candidate),
                Err(err) => {
                    tracing::warn!(
                        op = "scan_triggers",
                        event = EVENT_SKIPPED,
                        trigger = %trigger.display(),
                        err_code = err.code(),
                        error = %err,
                        "Skipping unreadable trigger"
                    );
                    None
                }
            }
        })))
    }

    fn complete(&self, candidate: &Candidate) -> Result<()> {
        let mut done = candidate.trigger_path.clone().into_os_string();
        done.push(DONE_SUFFIX);
        fs::rename(&candidate.trigger_path, &done)
            .map_err(|e| io_error("complete_trigger", e).with_path(&candidate.trigger_path))
    }
}
