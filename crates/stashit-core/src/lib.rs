//! stashit core - domain model, errors and logging
//!
//! This crate provides the foundational pieces shared by the store and the
//! engine:
//! - Identity, Generation, Fingerprint, InfoMap, PayloadOxum and manifest
//!   entries, with their text formats
//! - Transfer records as persisted by the ledger
//! - The canonical error facility (`ExError`) and the domain error enum
//! - The structured logging facility and its macros
//! - Ledger commit hooks

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod policy;

/// Re-exported for the logging macros
pub use stashit_core_types as core_types;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, StashError, TransferConflict};
pub use model::{
    Fingerprint, Generation, Identity, InfoMap, ManifestEntry, NewTransfer, PayloadOxum,
    TransferRecord,
};
pub use policy::{FailAfterIncrementHook, LedgerCommitHook, NoopLedgerCommitHook};
