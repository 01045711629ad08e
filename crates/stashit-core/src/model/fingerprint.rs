use crate::errors::{Result, StashError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA256 of a package's manifest file bytes, hex encoded
///
/// Computed over the exact bytes, not the parsed entries, so two packages
/// share a fingerprint only when their manifests are byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint raw manifest bytes
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap a stored hex digest, validating its shape
    pub fn from_hex(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let well_formed = value.len() == 64
            && value
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !well_formed {
            return Err(StashError::InvalidFingerprint { value });
        }
        Ok(Self(value))
    }

    /// Get the hex representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
