//! Migration framework
//!
//! Provides:
//! - Migration runner with checksum verification of applied migrations
//! - Idempotent application
//! - Embedded SQL migrations

mod checksums;
mod embedded;
mod runner;

pub use runner::apply_migrations;
