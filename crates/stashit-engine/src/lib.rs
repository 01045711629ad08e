//! stashit engine - orchestration layer
//!
//! Runs the ingest pipeline: trigger scanning, metadata acceptance, package
//! create-or-update, the dedup gate, versioned archival copy, and the ledger
//! commit. Coordinates the core domain model with the store.

pub mod commands;
pub mod config;

pub use commands::pipeline::{run_pipeline, CandidateOutcome, PipelineDeps, RunSummary};
pub use config::StashConfig;
