use rusqlite::Connection;
use stashit_core::policy::{LedgerCommitHook, NoopLedgerCommitHook};
use stashit_engine::commands::acceptance::RequiredKeysAcceptance;
use stashit_engine::commands::trigger::OkFileScanner;
use stashit_engine::{run_pipeline, PipelineDeps, RunSummary, StashConfig};
use stashit_store::errors::Result;
use stashit_store::{FileTransfer, NativeTransfer, TransferMethod};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Staging, archive and log directories plus a migrated ledger
pub struct Fixture {
    pub _tmp: TempDir,
    pub config: StashConfig,
    pub conn: Connection,
}

#[allow(dead_code)]
pub fn fixture() -> Fixture {
    let tmp = TempDir::new().unwrap();
    let transfer = tmp.path().join("transfer");
    let archive = tmp.path().join("archive");
    let logs = tmp.path().join("logs");
    for dir in [&transfer, &archive, &logs] {
        fs::create_dir_all(dir).unwrap();
    }
    let database = tmp.path().join("ledger.db");

    let mut config = StashConfig::new(transfer, archive, logs, &database);
    config.transfer_method = TransferMethod::Native;
    let conn = stashit_store::db::open_ledger(&database).unwrap();

    Fixture {
        _tmp: tmp,
        config,
        conn,
    }
}

/// Stage `<transfer>/<name>` with `files` and a trigger whose body is `metadata`
#[allow(dead_code)]
pub fn stage(fx: &Fixture, name: &str, files: &[(&str, &[u8])], metadata: &str) -> PathBuf {
    let dir = fx.config.transfer_dir.join(name);
    for (rel, content) in files {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        fx.config.transfer_dir.join(format!("{}.ok", name)),
        metadata,
    )
    .unwrap();
    dir
}

/// Two-file payload used by most scenarios
#[allow(dead_code)]
pub fn two_files() -> Vec<(&'static str, &'static [u8])> {
    vec![
        ("report.txt", b"annual report".as_slice()),
        ("images/scan.tif", b"\x49\x49\x2a\x00fake tiff".as_slice()),
    ]
}

#[allow(dead_code)]
pub fn run(fx: &mut Fixture) -> Result<RunSummary> {
    run_with(fx, &NativeTransfer, &NoopLedgerCommitHook)
}

#[allow(dead_code)]
pub fn run_with(
    fx: &mut Fixture,
    transfer: &dyn FileTransfer,
    hook: &dyn LedgerCommitHook,
) -> Result<RunSummary> {
    let scanner = OkFileScanner::new(&fx.config.transfer_dir, &fx.config.trigger_extension);
    let acceptance = RequiredKeysAcceptance::new(fx.config.required_metadata_keys.clone());
    let deps = PipelineDeps {
        transfer,
        acceptance: &acceptance,
        commit_hook: hook,
    };
    run_pipeline(&fx.config, &scanner, &mut fx.conn, &deps)
}
