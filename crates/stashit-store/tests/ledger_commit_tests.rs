// Integration tests for the ledger's atomic commit of an archived transfer

use rusqlite::Connection;
use stashit_core::errors::ExErrorKind;
use stashit_core::model::{Fingerprint, Generation, Identity, NewTransfer, PayloadOxum};
use stashit_core::policy::{FailAfterIncrementHook, NoopLedgerCommitHook};
use stashit_store::ledger::{
    commit_archived_transfer, find_transfers_by_fingerprint, get_submission_count, list_transfers,
};
use stashit_store::migrations::apply_migrations;

fn setup_ledger() -> Connection {
    let mut conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    apply_migrations(&mut conn).expect("migrations");
    conn
}

fn new_transfer(identity: &str, manifest: &str) -> NewTransfer {
    NewTransfer {
        identity: Identity::new(identity).unwrap(),
        correlation_token: format!("token-{}", manifest),
        transfer_date: NewTransfer::today(),
        payload_oxum: PayloadOxum::new(10, 2),
        fingerprint: Fingerprint::of_bytes(manifest.as_bytes()),
        elapsed_seconds: 1.5,
    }
}

#[test]
fn test_count_tracks_successful_commits() {
    let mut conn = setup_ledger();
    let id = Identity::new("coll1").unwrap();

    for k in 1..=3u32 {
        let transfer = new_transfer("coll1", &format!("manifest {}", k));
        let expected = Generation::next_after(u64::from(k - 1)).unwrap();
        let committed =
            commit_archived_transfer(&mut conn, &transfer, expected, &NoopLedgerCommitHook)
                .unwrap();
        assert_eq!(committed.generation.get(), k);
        assert_eq!(get_submission_count(&conn, &id).unwrap(), u64::from(k));
    }

    assert_eq!(list_transfers(&conn, Some("coll1")).unwrap().len(), 3);
}

#[test]
fn test_failure_between_writes_leaves_ledger_unchanged() {
    let mut conn = setup_ledger();
    let id = Identity::new("coll1").unwrap();
    let first = new_transfer("coll1", "first");
    commit_archived_transfer(&mut conn, &first, Generation::FIRST, &NoopLedgerCommitHook).unwrap();

    let baseline_count = get_submission_count(&conn, &id).unwrap();
    let baseline_records = list_transfers(&conn, None).unwrap();

    let second = new_transfer("coll1", "second");
    let expected = Generation::next_after(baseline_count).unwrap();
    let err = commit_archived_transfer(&mut conn, &second, expected, &FailAfterIncrementHook)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Internal);

    assert_eq!(get_submission_count(&conn, &id).unwrap(), baseline_count);
    assert_eq!(list_transfers(&conn, None).unwrap(), baseline_records);
    assert!(find_transfers_by_fingerprint(&conn, &second.fingerprint)
        .unwrap()
        .is_empty());

    // Retrying the same candidate derives the same generation
    let retried =
        commit_archived_transfer(&mut conn, &second, expected, &NoopLedgerCommitHook).unwrap();
    assert_eq!(retried.generation.get(), 2);
    assert_eq!(get_submission_count(&conn, &id).unwrap(), 2);
}

#[test]
fn test_stale_generation_is_refused() {
    let mut conn = setup_ledger();
    let first = new_transfer("coll1", "first");
    commit_archived_transfer(&mut conn, &first, Generation::FIRST, &NoopLedgerCommitHook).unwrap();

    // Archived as t1 again, but t1 is already committed
    let stale = new_transfer("coll1", "stale");
    let err = commit_archived_transfer(&mut conn, &stale, Generation::FIRST, &NoopLedgerCommitHook)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Concurrency);
    assert_eq!(err.identity(), Some("coll1"));
    assert_eq!(
        get_submission_count(&conn, &Identity::new("coll1").unwrap()).unwrap(),
        1
    );
}

#[test]
fn test_count_survives_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");
    {
        let mut conn = stashit_store::db::open_ledger(&path).unwrap();
        let t = new_transfer("demoA", "m");
        commit_archived_transfer(&mut conn, &t, Generation::FIRST, &NoopLedgerCommitHook).unwrap();
    }
    let conn = stashit_store::db::open_ledger(&path).unwrap();
    let id = Identity::new("demoA").unwrap();
    assert_eq!(get_submission_count(&conn, &id).unwrap(), 1);
}
