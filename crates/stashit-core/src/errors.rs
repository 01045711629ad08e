use stashit_core_types::RunId;
use thiserror::Error;

/// Result type alias using StashError
pub type Result<T> = std::result::Result<T, StashError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// handling, log filtering and test assertions. Kinds are split into
/// run-level kinds (see [`ExErrorKind::is_fatal`]) that abort the whole
/// batch and per-candidate kinds that only abandon the candidate at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Run-level
    /// Required directories or settings are missing
    Configuration,
    /// Identical manifest content was already recorded in the ledger
    Collision,
    /// A ledger schema invariant does not hold (e.g. duplicate identity rows)
    LedgerIntegrity,

    // Per-candidate
    /// A package could not be built, opened or persisted, or is invalid
    Packaging,
    /// The archived copy failed its independent validity check
    ArchiveVerification,
    /// Another writer advanced the submission count between archive and commit
    Concurrency,

    // Structural/Validation
    InvalidInput,
    NotFound,
    ConstraintViolation,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    ExternalService,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::Collision => "ERR_COLLISION",
            ExErrorKind::LedgerIntegrity => "ERR_LEDGER_INTEGRITY",
            ExErrorKind::Packaging => "ERR_PACKAGING",
            ExErrorKind::ArchiveVerification => "ERR_ARCHIVE_VERIFICATION",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether an error of this kind terminates the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExErrorKind::Configuration | ExErrorKind::Collision | ExErrorKind::LedgerIntegrity
        )
    }
}

/// The ledger record a colliding submission conflicts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConflict {
    pub transfer_id: i64,
    pub identity: String,
    pub correlation_token: String,
}

/// Canonical structured error type
///
/// Carries a classification kind plus the context an operator needs to act
/// on a failed candidate later: which identity, which directory, which
/// fingerprint, and which run.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    identity: Option<String>,
    path: Option<String>,
    fingerprint: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
    conflict: Option<TransferConflict>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            identity: None,
            path: None,
            fingerprint: None,
            run_id: None,
            message: String::new(),
            source: None,
            conflict: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add identity context
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Add filesystem path context
    pub fn with_path(mut self, path: impl AsRef<std::path::Path>) -> Self {
        self.path = Some(path.as_ref().display().to_string());
        self
    }

    /// Add fingerprint context
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Attach the ledger record this error conflicts with
    pub fn with_conflict(mut self, conflict: TransferConflict) -> Self {
        self.conflict = Some(conflict);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Whether this error terminates the whole run
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the identity context, if any
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the fingerprint context, if any
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the conflicting ledger record, if any (populated on Collision)
    pub fn conflict(&self) -> Option<&TransferConflict> {
        self.conflict.as_ref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(identity) = &self.identity {
            write!(f, " (identity: {})", identity)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(fingerprint) = &self.fingerprint {
            write!(f, " (fingerprint: {})", fingerprint)?;
        }
        if let Some(conflict) = &self.conflict {
            write!(
                f,
                " (conflicts with transfer {} of {} token {})",
                conflict.transfer_id, conflict.identity, conflict.correlation_token
            )?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Errors raised by pure domain operations (parsing, naming)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StashError {
    /// A directory name cannot serve as an identity
    #[error("Invalid identity {value:?}: {reason}")]
    InvalidIdentity { value: String, reason: String },

    /// A line of a descriptive-info file is malformed
    #[error("Invalid info line {line_no}: {line:?}")]
    InvalidInfoLine { line_no: usize, line: String },

    /// A line of a manifest file is malformed
    #[error("Invalid manifest line {line_no}: {line:?}")]
    InvalidManifestLine { line_no: usize, line: String },

    /// A Payload-Oxum value is not `<octets>.<streams>`
    #[error("Invalid Payload-Oxum: {value:?}")]
    InvalidPayloadOxum { value: String },

    /// A fingerprint is not a 64 character hex string
    #[error("Invalid fingerprint: {value:?}")]
    InvalidFingerprint { value: String },

    /// A generation number outside the representable range
    #[error("Invalid generation: {reason}")]
    InvalidGeneration { reason: String },
}

impl From<StashError> for ExError {
    fn from(err: StashError) -> Self {
        match err {
            StashError::InvalidIdentity { value, reason } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_identity(value)
                    .with_message(format!("Invalid identity: {}", reason))
            }
            StashError::InvalidInfoLine { line_no, line } => {
                ExError::new(ExErrorKind::Serialization).with_message(format!(
                    "Invalid info line {}: {:?}",
                    line_no, line
                ))
            }
            StashError::InvalidManifestLine { line_no, line } => {
                ExError::new(ExErrorKind::Serialization).with_message(format!(
                    "Invalid manifest line {}: {:?}",
                    line_no, line
                ))
            }
            StashError::InvalidPayloadOxum { value } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Invalid Payload-Oxum: {:?}", value)),
            StashError::InvalidFingerprint { value } => ExError::new(ExErrorKind::InvalidInput)
                .with_fingerprint(value)
                .with_message("Invalid fingerprint"),
            StashError::InvalidGeneration { reason } => ExError::new(ExErrorKind::Internal)
                .with_message(format!("Invalid generation: {}", reason)),
        }
    }
}
