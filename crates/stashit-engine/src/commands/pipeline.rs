//! Pipeline Controller
//!
//! Drives each candidate through
//! `Discovered → MetadataAccepted → PackageBuilt → PackageValid? →
//! Fingerprinted → Unique? → Archived → DestinationValid? → Committed`.
//!
//! Candidates are processed one at a time in scanner order. A rejected or
//! failed candidate is logged and skipped without ledger writes; run-level
//! errors (see `ExErrorKind::is_fatal`) stop the run and propagate.
//!
//! ## Logging
//!
//! - `log_op_start!` / `log_op_end!` / `log_op_error!` around the run and
//!   around each candidate
//! - rejected candidates as `event = "rejected"` warnings with a reason

use crate::commands::acceptance::MetadataAcceptance;
use crate::commands::archive::archive;
use crate::commands::dedup::check_unique;
use crate::commands::trigger::{Candidate, TriggerScanner};
use crate::config::StashConfig;
use rusqlite::Connection;
use stashit_core::errors::{ExError, ExErrorKind};
use stashit_core::model::info::EXTERNAL_IDENTIFIER;
use stashit_core::model::{Fingerprint, Generation, Identity, NewTransfer};
use stashit_core::policy::LedgerCommitHook;
use stashit_core::{log_op_end, log_op_error, log_op_start};
use stashit_core_types::schema::EVENT_REJECTED;
use stashit_core_types::RunId;
use stashit_store::errors::Result;
use stashit_store::ledger::commit_archived_transfer;
use stashit_store::{open_or_create, FileTransfer};
use std::path::PathBuf;
use std::time::Instant;

/// Collaborators the pipeline calls out to
pub struct PipelineDeps<'a> {
    pub transfer: &'a dyn FileTransfer,
    pub acceptance: &'a dyn MetadataAcceptance,
    pub commit_hook: &'a dyn LedgerCommitHook,
}

/// A candidate that reached `Committed`
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedCandidate {
    pub identity: Identity,
    pub generation: Generation,
    pub destination: PathBuf,
    pub transfer_id: i64,
    pub fingerprint: Fingerprint,
}

/// Terminal state of one candidate
#[derive(Debug, Clone)]
pub enum CandidateOutcome {
    Committed(CommittedCandidate),
    /// Metadata not accepted, or the source package is invalid
    Rejected { identity: Identity, reason: String },
    /// A per-candidate error; nothing was written to the ledger
    Failed { identity: Identity, error: ExError },
}

/// What one run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: RunId,
    pub discovered: usize,
    pub committed: Vec<CommittedCandidate>,
    pub rejected: Vec<(Identity, String)>,
    pub failed: Vec<(Identity, ExError)>,
}

impl RunSummary {
    fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            discovered: 0,
            committed: Vec::new(),
            rejected: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Process every candidate the scanner yields.
///
/// A committed candidate is marked complete with the scanner; others keep
/// their trigger and stay eligible for a later run.
///
/// # Errors
///
/// The first run-level error (`Collision`, `LedgerIntegrity`,
/// `Configuration`), tagged with the run id, or a failure to scan.
pub fn run_pipeline(
    config: &StashConfig,
    scanner: &dyn TriggerScanner,
    conn: &mut Connection,
    deps: &PipelineDeps<'_>,
) -> Result<RunSummary> {
    let run_id = RunId::new();
    log_op_start!("run_pipeline", run_id = %run_id);
    let start = Instant::now();
    let mut summary = RunSummary::new(run_id.clone());

    let candidates = scanner.scan().map_err(|e| e.with_run_id(run_id.clone()))?;
    for candidate in candidates {
        summary.discovered += 1;
        match process_candidate(&candidate, config, conn, deps) {
            Ok(CandidateOutcome::Committed(committed)) => {
                if let Err(err) = scanner.complete(&candidate) {
                    tracing::warn!(
                        identity = %candidate.identity,
                        trigger = %candidate.trigger_path.display(),
                        error = %err,
                        "Committed but could not mark trigger done"
                    );
                }
                summary.committed.push(committed);
            }
            Ok(CandidateOutcome::Rejected { identity, reason }) => {
                summary.rejected.push((identity, reason));
            }
            Ok(CandidateOutcome::Failed { identity, error }) => {
                summary.failed.push((identity, error));
            }
            Err(fatal) => {
                let fatal = fatal.with_run_id(run_id.clone());
                log_op_error!(
                    "run_pipeline",
                    fatal.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    run_id = %run_id
                );
                return Err(fatal);
            }
        }
    }

    if summary.discovered == 0 {
        tracing::info!(run_id = %run_id, "No transfers found");
    }

    log_op_end!(
        "run_pipeline",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = %run_id,
        discovered = summary.discovered,
        committed = summary.committed.len(),
        rejected = summary.rejected.len(),
        failed = summary.failed.len()
    );

    Ok(summary)
}

/// Drive one candidate to a terminal state.
///
/// # Errors
///
/// Only run-level errors; per-candidate errors become
/// [`CandidateOutcome::Failed`].
pub fn process_candidate(
    candidate: &Candidate,
    config: &StashConfig,
    conn: &mut Connection,
    deps: &PipelineDeps<'_>,
) -> Result<CandidateOutcome> {
    let identity = &candidate.identity;
    let source_dir = candidate.source_dir.display();
    log_op_start!("process_candidate", identity = %identity, source_dir = %source_dir);
    let start = Instant::now();

    let outcome = match ingest(candidate, config, conn, deps) {
        Ok(outcome) => outcome,
        Err(err) => {
            let err = err.with_identity(identity.as_str());
            log_op_error!(
                "process_candidate",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                identity = %identity,
                source_dir = %source_dir
            );
            if err.is_fatal() {
                return Err(err);
            }
            return Ok(CandidateOutcome::Failed {
                identity: identity.clone(),
                error: err,
            });
        }
    };

    match &outcome {
        CandidateOutcome::Committed(committed) => {
            log_op_end!(
                "process_candidate",
                duration_ms = start.elapsed().as_millis() as u64,
                identity = %identity,
                generation = committed.generation.get(),
                transfer_id = committed.transfer_id,
                destination = %committed.destination.display()
            );
        }
        CandidateOutcome::Rejected { reason, .. } => {
            tracing::warn!(
                op = "process_candidate",
                event = EVENT_REJECTED,
                identity = %identity,
                source_dir = %source_dir,
                reason = %reason,
                "Candidate rejected"
            );
        }
        CandidateOutcome::Failed { .. } => {}
    }

    Ok(outcome)
}

fn ingest(
    candidate: &Candidate,
    config: &StashConfig,
    conn: &mut Connection,
    deps: &PipelineDeps<'_>,
) -> Result<CandidateOutcome> {
    let identity = &candidate.identity;

    let Some(metadata) = deps.acceptance.accept(&candidate.metadata) else {
        return Ok(CandidateOutcome::Rejected {
            identity: identity.clone(),
            reason: "metadata not accepted".to_string(),
        });
    };

    let (package, validity) = open_or_create(&candidate.source_dir, &metadata)?;
    if !validity.is_valid() {
        return Ok(CandidateOutcome::Rejected {
            identity: identity.clone(),
            reason: format!("package is invalid: {}", validity.summary()),
        });
    }

    let fingerprint = check_unique(&package.manifest_path(), conn)?;

    let correlation_token = package
        .info()
        .get(EXTERNAL_IDENTIFIER)
        .map(str::to_string)
        .ok_or_else(|| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("process_candidate")
                .with_path(&candidate.source_dir)
                .with_message(format!("package has no {}", EXTERNAL_IDENTIFIER))
        })?;
    let payload_oxum = package.payload_oxum()?;

    let archived = archive(
        &candidate.source_dir,
        identity,
        conn,
        &config.archive_dir,
        deps.transfer,
    )?;

    let transfer = NewTransfer {
        identity: identity.clone(),
        correlation_token,
        transfer_date: NewTransfer::today(),
        payload_oxum,
        fingerprint: fingerprint.clone(),
        elapsed_seconds: archived.elapsed_seconds,
    };
    let committed =
        commit_archived_transfer(conn, &transfer, archived.generation, deps.commit_hook)?;

    Ok(CandidateOutcome::Committed(CommittedCandidate {
        identity: identity.clone(),
        generation: committed.generation,
        destination: archived.destination,
        transfer_id: committed.transfer_id,
        fingerprint,
    }))
}
