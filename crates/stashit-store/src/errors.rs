//! Error handling for stashit-store
//!
//! Wraps stashit-core ExError with store-specific helpers

use stashit_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a packaging error for the package at `dir`
pub fn packaging_error(op: &str, dir: &Path, message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Packaging)
        .with_op(op.to_string())
        .with_path(dir)
        .with_message(message)
}

/// Create a ledger integrity error (schema invariant violated)
pub fn ledger_integrity(identity: &str, message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::LedgerIntegrity)
        .with_op("get_submission_count")
        .with_identity(identity)
        .with_message(message)
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
