//! stashit store - persistence for the ingest pipeline
//!
//! Provides:
//! - SQLite ledger with embedded migrations
//! - BagIt package adapter with atomic tag file writes
//! - File transfer methods for archival copies

pub mod atomic;
pub mod db;
pub mod errors;
pub mod ledger;
pub mod migrations;
pub mod package;
pub mod transfer;

// Re-export key types
pub use errors::Result;
pub use package::{open_or_create, Package, ValidationProblem, Validity};
pub use transfer::{FileTransfer, NativeTransfer, RsyncTransfer, TransferMethod};
