//! Dedup Gate
//!
//! The fingerprint is the sha256 of the manifest file's exact bytes. Any
//! committed transfer with the same fingerprint is a collision, which is
//! fatal for the run.

use rusqlite::Connection;
use stashit_core::errors::{ExError, ExErrorKind, TransferConflict};
use stashit_core::model::Fingerprint;
use stashit_store::errors::{io_error, Result};
use stashit_store::ledger::find_transfers_by_fingerprint;
use std::path::Path;

/// Fingerprint of the manifest at `manifest_path`
pub fn fingerprint_manifest(manifest_path: &Path) -> Result<Fingerprint> {
    let bytes = std::fs::read(manifest_path)
        .map_err(|e| io_error("fingerprint_manifest", e).with_path(manifest_path))?;
    Ok(Fingerprint::of_bytes(&bytes))
}

/// Fingerprint the manifest and make sure the ledger has never seen it.
///
/// # Errors
///
/// - `ExErrorKind::Collision`: a committed transfer has this fingerprint;
///   the error carries the first conflicting record
/// - `ExErrorKind::Io` / `ExErrorKind::Persistence`: read or query failed
pub fn check_unique(manifest_path: &Path, conn: &Connection) -> Result<Fingerprint> {
    let fingerprint = fingerprint_manifest(manifest_path)?;
    let matches = find_transfers_by_fingerprint(conn, &fingerprint)?;

    let Some(first) = matches.first() else {
        return Ok(fingerprint);
    };

    Err(ExError::new(ExErrorKind::Collision)
        .with_op("check_unique")
        .with_path(manifest_path)
        .with_fingerprint(fingerprint.as_str())
        .with_message(format!(
            "manifest already recorded by {} transfer(s)",
            matches.len()
        ))
        .with_conflict(TransferConflict {
            transfer_id: first.transfer_id,
            identity: first.identity.clone(),
            correlation_token: first.correlation_token.clone(),
        }))
}
