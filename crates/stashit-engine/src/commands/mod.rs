//! Pipeline commands.
//!
//! Leaves first: trigger scanning and metadata acceptance feed candidates to
//! the pipeline, which runs each through the dedup gate and the archiver
//! before committing to the ledger.

pub mod acceptance;
pub mod archive;
pub mod dedup;
pub mod pipeline;
pub mod trigger;
