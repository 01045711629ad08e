use crate::errors::{from_rusqlite, Result};
use crate::ledger::submissions::{get_submission_count, increment_submission};
use crate::ledger::transfers::record_transfer;
use rusqlite::{Connection, TransactionBehavior};
use stashit_core::errors::{ExError, ExErrorKind};
use stashit_core::model::{Generation, NewTransfer};
use stashit_core::policy::LedgerCommitHook;

/// Outcome of a committed archival transfer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommittedTransfer {
    pub transfer_id: i64,
    pub generation: Generation,
}

/// Commit one archived transfer: increment the identity's submission count
/// and append its transfer record, in a single transaction.
///
/// `expected_generation` is the generation the archive copy was written to.
/// The count is re-read under an immediate (write-locked) transaction and must
/// still be `expected_generation - 1`, otherwise another writer committed the
/// same identity in between and the commit is refused.
///
/// `hook` runs between the two writes; if it fails, or either write fails,
/// the transaction is rolled back and the ledger is left as it was.
///
/// ## Errors
///
/// - `ExErrorKind::Concurrency`: the submission count moved since the copy
/// - `ExErrorKind::LedgerIntegrity`: duplicate submission rows
/// - `ExErrorKind::Persistence`: database error
/// - Any error returned by `hook`
pub fn commit_archived_transfer(
    conn: &mut Connection,
    transfer: &NewTransfer,
    expected_generation: Generation,
    hook: &dyn LedgerCommitHook,
) -> Result<CommittedTransfer> {
    let identity = &transfer.identity;
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)?;

    let current = get_submission_count(&tx, identity)?;
    let generation = Generation::next_after(current)?;
    if generation != expected_generation {
        return Err(ExError::new(ExErrorKind::Concurrency)
            .with_op("commit_archived_transfer")
            .with_identity(identity.as_str())
            .with_message(format!(
                "archived as generation {} but ledger now expects generation {}",
                expected_generation, generation
            )));
    }

    let count = increment_submission(&tx, identity)?;
    hook.after_increment(identity)?;
    let transfer_id = record_transfer(&tx, transfer)?;

    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(
        identity = %identity,
        transfer_id,
        count,
        fingerprint = %transfer.fingerprint,
        "Committed transfer to ledger"
    );

    Ok(CommittedTransfer {
        transfer_id,
        generation,
    })
}
