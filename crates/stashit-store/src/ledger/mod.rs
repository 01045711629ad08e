//! The Ledger
//!
//! Two tables shared across runs:
//! - `submissions`: one row per identity holding how many archival copies of
//!   it have been committed
//! - `transfers`: append-only records of every committed transfer, keyed for
//!   lookup by manifest fingerprint
//!
//! Reads take any `&Connection` (a `Transaction` derefs to one). The two
//! writes are only ever committed together through
//! [`commit_archived_transfer`].

mod commit;
mod submissions;
mod transfers;

pub use commit::{commit_archived_transfer, CommittedTransfer};
pub use submissions::{get_submission_count, increment_submission};
pub use transfers::{find_transfers_by_fingerprint, get_transfer, list_transfers, record_transfer};
