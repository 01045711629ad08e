//! Ledger commit hooks
//!
//! A `LedgerCommitHook` is invoked inside the ledger commit transaction,
//! between the submission-count upsert and the transfer-record insert. An
//! error returned from the hook aborts the transaction, so neither write
//! survives. Production runs use [`NoopLedgerCommitHook`]; tests use
//! [`FailAfterIncrementHook`] to model a crash between the two writes.

use crate::errors::{ExError, ExErrorKind};
use crate::model::Identity;

/// Hook called between the two writes of one ledger commit.
pub trait LedgerCommitHook: Send + Sync {
    /// Called after the submission count for `identity` has been incremented
    /// (uncommitted) and before the transfer record is inserted.
    ///
    /// # Errors
    ///
    /// Any error aborts the commit and rolls back the increment.
    fn after_increment(&self, identity: &Identity) -> std::result::Result<(), ExError>;
}

/// Always continues (CLI default).
pub struct NoopLedgerCommitHook;

impl LedgerCommitHook for NoopLedgerCommitHook {
    fn after_increment(&self, _: &Identity) -> std::result::Result<(), ExError> {
        Ok(())
    }
}

/// Always fails, simulating a crash between the increment and the insert.
pub struct FailAfterIncrementHook;

impl LedgerCommitHook for FailAfterIncrementHook {
    fn after_increment(&self, identity: &Identity) -> std::result::Result<(), ExError> {
        Err(ExError::new(ExErrorKind::Internal)
            .with_op("ledger_commit")
            .with_identity(identity.as_str())
            .with_message("injected failure between submission increment and transfer insert"))
    }
}
