use crate::errors::{Result, StashError};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// Stable key for a logical, repeatable submission source
///
/// Derived from the basename of the source directory. Used both as the
/// ledger's submission-count key and as the archive path prefix, so it must
/// be a single, non-special path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    /// Validate and wrap an identity string
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let reason = if value.is_empty() {
            Some("must not be empty")
        } else if value == "." || value == ".." {
            Some("must not be a relative directory marker")
        } else if value.contains('/') || value.contains('\\') {
            Some("must be a single path component")
        } else if value.chars().any(|c| c.is_control()) {
            Some("must not contain control characters")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(StashError::InvalidIdentity {
                value,
                reason: reason.to_string(),
            }),
            None => Ok(Self(value)),
        }
    }

    /// Derive the identity from a source directory path.
    ///
    /// The path is normalised lexically first, so `a/b/` and `a/b/./` both
    /// yield `b`, and `a/b/c/..` yields `b`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
        for component in dir.components() {
            match component {
                Component::Normal(part) => parts.push(part),
                Component::ParentDir => {
                    parts.pop();
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }

        let Some(last) = parts.last() else {
            return Err(StashError::InvalidIdentity {
                value: dir.display().to_string(),
                reason: "path has no directory name".to_string(),
            });
        };
        let Some(name) = last.to_str() else {
            return Err(StashError::InvalidIdentity {
                value: dir.display().to_string(),
                reason: "directory name is not valid UTF-8".to_string(),
            });
        };
        Self::new(name)
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1-based sequence number of an identity's successful archival copies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(u32);

impl Generation {
    /// The first generation of any identity
    pub const FIRST: Generation = Generation(1);

    /// Generation that follows `count` committed submissions
    pub fn next_after(count: u64) -> Result<Self> {
        let next = count
            .checked_add(1)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| StashError::InvalidGeneration {
                reason: format!("submission count {} is out of range", count),
            })?;
        Ok(Self(next))
    }

    /// Get the numeric value
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Directory name of this generation inside the identity's archive
    pub fn dir_name(&self) -> String {
        format!("t{}", self.0)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
