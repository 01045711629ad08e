use crate::errors::{from_rusqlite, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use stashit_core::errors::{ExError, ExErrorKind};
use stashit_core::model::{Fingerprint, NewTransfer, TransferRecord};

const SELECT_TRANSFER: &str = "SELECT transfer_id, identity, correlation_token, transfer_date, \
     payload_oxum, fingerprint, elapsed_seconds FROM transfers";

fn map_transfer_row(row: &Row<'_>) -> rusqlite::Result<TransferRecord> {
    Ok(TransferRecord {
        transfer_id: row.get(0)?,
        identity: row.get(1)?,
        correlation_token: row.get(2)?,
        transfer_date: row.get(3)?,
        payload_oxum: row.get(4)?,
        fingerprint: row.get(5)?,
        elapsed_seconds: row.get(6)?,
    })
}

/// Append a transfer record and return its assigned transfer id.
///
/// Callers commit this only as part of [`super::commit_archived_transfer`].
pub fn record_transfer(conn: &Connection, transfer: &NewTransfer) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO transfers (
            identity,
            correlation_token,
            transfer_date,
            payload_oxum,
            fingerprint,
            elapsed_seconds
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        rusqlite::params![
            transfer.identity.as_str(),
            transfer.correlation_token,
            transfer.transfer_date,
            transfer.payload_oxum.to_string(),
            transfer.fingerprint.as_str(),
            transfer.elapsed_seconds,
        ],
    )
    .map_err(|e| {
        ExError::new(ExErrorKind::Persistence)
            .with_op("record_transfer")
            .with_identity(transfer.identity.as_str())
            .with_message(format!("Failed to insert transfer: {}", e))
    })?;

    Ok(conn.last_insert_rowid())
}

/// All transfer records whose fingerprint equals `fingerprint`
pub fn find_transfers_by_fingerprint(
    conn: &Connection,
    fingerprint: &Fingerprint,
) -> Result<Vec<TransferRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "{} WHERE fingerprint = ?1 ORDER BY transfer_id",
            SELECT_TRANSFER
        ))
        .map_err(from_rusqlite)?;
    let records = stmt
        .query_map([fingerprint.as_str()], map_transfer_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(records)
}

/// Transfer records ordered by transfer id, optionally for one identity only
pub fn list_transfers(conn: &Connection, identity: Option<&str>) -> Result<Vec<TransferRecord>> {
    let records = match identity {
        Some(identity) => {
            let mut stmt = conn
                .prepare(&format!(
                    "{} WHERE identity = ?1 ORDER BY transfer_id",
                    SELECT_TRANSFER
                ))
                .map_err(from_rusqlite)?;
            let rows = stmt
                .query_map([identity], map_transfer_row)
                .map_err(from_rusqlite)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(from_rusqlite)?;
            rows
        }
        None => {
            let mut stmt = conn
                .prepare(&format!("{} ORDER BY transfer_id", SELECT_TRANSFER))
                .map_err(from_rusqlite)?;
            let rows = stmt
                .query_map([], map_transfer_row)
                .map_err(from_rusqlite)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(from_rusqlite)?;
            rows
        }
    };
    Ok(records)
}

/// One transfer record by id
///
/// ## Errors
///
/// - `ExErrorKind::NotFound`: no record has this id
pub fn get_transfer(conn: &Connection, transfer_id: i64) -> Result<TransferRecord> {
    conn.query_row(
        &format!("{} WHERE transfer_id = ?1", SELECT_TRANSFER),
        [transfer_id],
        map_transfer_row,
    )
    .optional()
    .map_err(from_rusqlite)?
    .ok_or_else(|| {
        ExError::new(ExErrorKind::NotFound)
            .with_op("get_transfer")
            .with_message(format!("Transfer {} not found", transfer_id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::apply_migrations;
    use stashit_core::model::{Identity, PayloadOxum};

    fn ledger() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    fn transfer(identity: &str, manifest: &[u8]) -> NewTransfer {
        NewTransfer {
            identity: Identity::new(identity).unwrap(),
            correlation_token: format!("{}-token", identity),
            transfer_date: "20260101".into(),
            payload_oxum: PayloadOxum::new(12, 2),
            fingerprint: Fingerprint::of_bytes(manifest),
            elapsed_seconds: 0.25,
        }
    }

    #[test]
    fn test_record_and_find_by_fingerprint() {
        let conn = ledger();
        let t = transfer("demoA", b"manifest A");
        let id = record_transfer(&conn, &t).unwrap();

        let found = find_transfers_by_fingerprint(&conn, &t.fingerprint).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].transfer_id, id);
        assert_eq!(found[0].identity, "demoA");
        assert_eq!(found[0].payload_oxum, "12.2");

        let other = Fingerprint::of_bytes(b"manifest B");
        assert!(find_transfers_by_fingerprint(&conn, &other)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_transfer_ids_increase() {
        let conn = ledger();
        let first = record_transfer(&conn, &transfer("a", b"1")).unwrap();
        let second = record_transfer(&conn, &transfer("b", b"2")).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_list_filters_by_identity() {
        let conn = ledger();
        record_transfer(&conn, &transfer("a", b"1")).unwrap();
        record_transfer(&conn, &transfer("b", b"2")).unwrap();
        record_transfer(&conn, &transfer("a", b"3")).unwrap();

        assert_eq!(list_transfers(&conn, None).unwrap().len(), 3);
        let only_a = list_transfers(&conn, Some("a")).unwrap();
        assert_eq!(only_a.len(), 2);
        assert!(only_a[0].transfer_id < only_a[1].transfer_id);
    }

    #[test]
    fn test_get_transfer_not_found() {
        let conn = ledger();
        let err = get_transfer(&conn, 42).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[test]
    fn test_transfers_are_append_only() {
        let conn = ledger();
        let id = record_transfer(&conn, &transfer("a", b"1")).unwrap();
        assert!(conn
            .execute("UPDATE transfers SET identity = 'x' WHERE transfer_id = ?1", [id])
            .is_err());
        assert!(conn
            .execute("DELETE FROM transfers WHERE transfer_id = ?1", [id])
            .is_err());
        assert_eq!(get_transfer(&conn, id).unwrap().identity, "a");
    }
}
