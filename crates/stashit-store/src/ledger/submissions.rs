use crate::errors::{from_rusqlite, ledger_integrity, Result};
use rusqlite::Connection;
use stashit_core::model::Identity;

/// Number of committed archival copies of `identity` (0 if never seen).
///
/// ## Errors
///
/// - `ExErrorKind::LedgerIntegrity`: more than one row exists for the identity
/// - `ExErrorKind::Persistence`: the query failed
pub fn get_submission_count(conn: &Connection, identity: &Identity) -> Result<u64> {
    let mut stmt = conn
        .prepare("SELECT count FROM submissions WHERE identity = ?1")
        .map_err(from_rusqlite)?;
    let counts: Vec<i64> = stmt
        .query_map([identity.as_str()], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    match counts.as_slice() {
        [] => Ok(0),
        [count] => u64::try_from(*count).map_err(|_| {
            ledger_integrity(
                identity.as_str(),
                format!("negative submission count {}", count),
            )
        }),
        rows => Err(ledger_integrity(
            identity.as_str(),
            format!("{} submission rows for one identity", rows.len()),
        )),
    }
}

/// Insert `identity` with count 1, or add one to its existing count.
///
/// Returns the new count. Callers commit this only as part of
/// [`super::commit_archived_transfer`].
pub fn increment_submission(conn: &Connection, identity: &Identity) -> Result<u64> {
    conn.execute(
        "INSERT INTO submissions (identity) VALUES (?1)
         ON CONFLICT(identity) DO UPDATE SET count = count + 1",
        [identity.as_str()],
    )
    .map_err(from_rusqlite)?;

    get_submission_count(conn, identity)
}
