//! Ledger history command

use clap::Args;
use stashit_core::errors::{ExError, ExErrorKind};
use stashit_core::model::TransferRecord;
use stashit_store::ledger::{get_transfer, list_transfers};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Ledger database file
    #[arg(long, env = "DATABASE")]
    pub database: PathBuf,

    /// Only transfers of this identity
    #[arg(long, conflicts_with = "id")]
    pub identity: Option<String>,

    /// A single transfer by id
    #[arg(long)]
    pub id: Option<i64>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: HistoryArgs) -> Result<(), ExError> {
    let conn = stashit_store::db::open_ledger(&args.database)?;

    let records = match args.id {
        Some(id) => vec![get_transfer(&conn, id)?],
        None => list_transfers(&conn, args.identity.as_deref())?,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&records).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("history")
                .with_message(e.to_string())
        })?;
        println!("{}", json);
    } else {
        print_table(&records);
    }
    Ok(())
}

fn print_table(records: &[TransferRecord]) {
    if records.is_empty() {
        println!("No transfers recorded");
        return;
    }
    println!("ID\tIDENTITY\tDATE\tPAYLOAD\tSECONDS\tFINGERPRINT\tTOKEN");
    for r in records {
        println!(
            "{}\t{}\t{}\t{}\t{:.3}\t{}\t{}",
            r.transfer_id,
            r.identity,
            r.transfer_date,
            r.payload_oxum,
            r.elapsed_seconds,
            r.fingerprint,
            r.correlation_token
        );
    }
}
