//! Archiver
//!
//! Copies a validated package to `<archive_root>/<identity>/t<generation>`
//! and re-validates the copy before anything is recorded.

use rusqlite::Connection;
use stashit_core::errors::{ExError, ExErrorKind};
use stashit_core::model::{Generation, Identity};
use stashit_store::errors::{io_error, Result};
use stashit_store::ledger::get_submission_count;
use stashit_store::{FileTransfer, Package};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A verified archival copy, not yet recorded in the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveOutcome {
    pub destination: PathBuf,
    pub generation: Generation,
    pub elapsed_seconds: f64,
}

/// Where generation `generation` of `identity` lives in the archive
pub fn destination_for(archive_root: &Path, identity: &Identity, generation: Generation) -> PathBuf {
    archive_root
        .join(identity.as_str())
        .join(generation.dir_name())
}

/// Copy `source_dir` into the next generation of `identity` and verify it.
///
/// No committed transfer refers to generation `count + 1`, so anything
/// already at the destination was left by an attempt that never reached its
/// ledger commit. It is removed before the copy.
///
/// # Errors
///
/// - `ExErrorKind::ArchiveVerification`: the copy is not a valid package
/// - `ExErrorKind::ExternalService` / `ExErrorKind::Io`: the copy failed
/// - `ExErrorKind::LedgerIntegrity`: duplicate submission rows
pub fn archive(
    source_dir: &Path,
    identity: &Identity,
    conn: &Connection,
    archive_root: &Path,
    transfer: &dyn FileTransfer,
) -> Result<ArchiveOutcome> {
    let count = get_submission_count(conn, identity)?;
    let generation = Generation::next_after(count)?;
    let destination = destination_for(archive_root, identity, generation);

    if destination.exists() {
        tracing::warn!(
            identity = %identity,
            generation = generation.get(),
            destination = %destination.display(),
            "Removing uncommitted copy left by an earlier attempt"
        );
        std::fs::remove_dir_all(&destination)
            .map_err(|e| io_error("archive", e).with_path(&destination))?;
    }
    std::fs::create_dir_all(&destination)
        .map_err(|e| io_error("archive", e).with_path(&destination))?;

    let start = Instant::now();
    transfer
        .transfer(source_dir, &destination)
        .map_err(|e| e.with_identity(identity.as_str()))?;
    let elapsed_seconds = start.elapsed().as_secs_f64();

    tracing::info!(
        identity = %identity,
        generation = generation.get(),
        method = transfer.name(),
        elapsed_seconds,
        destination = %destination.display(),
        "Copied package to archive"
    );

    verify_destination(&destination, identity)?;

    Ok(ArchiveOutcome {
        destination,
        generation,
        elapsed_seconds,
    })
}

fn verify_destination(destination: &Path, identity: &Identity) -> Result<()> {
    let failed = |message: String| {
        ExError::new(ExErrorKind::ArchiveVerification)
            .with_op("verify_destination")
            .with_identity(identity.as_str())
            .with_path(destination)
            .with_message(message)
    };

    let package = Package::open_existing(destination)
        .map_err(|e| failed("cannot open archived package".to_string()).with_source(e))?
        .ok_or_else(|| failed("archived copy is not a package".to_string()))?;

    let validity = package.validate();
    if !validity.is_valid() {
        return Err(failed(format!(
            "archived package is invalid: {}",
            validity.summary()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_layout() {
        let id = Identity::new("coll1").unwrap();
        let gen = Generation::next_after(2).unwrap();
        assert_eq!(
            destination_for(Path::new("/archive"), &id, gen),
            PathBuf::from("/archive/coll1/t3")
        );
    }
}
