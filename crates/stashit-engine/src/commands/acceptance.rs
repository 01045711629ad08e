//! Metadata acceptance
//!
//! Decides whether a candidate's descriptive metadata may be ingested, and
//! enriches accepted metadata with a correlation token.

use stashit_core::model::info::EXTERNAL_IDENTIFIER;
use stashit_core::model::InfoMap;
use uuid::Uuid;

/// Accepts (possibly enriched) or rejects a candidate's metadata
pub trait MetadataAcceptance {
    /// The accepted map, or `None` when the metadata is rejected
    fn accept(&self, metadata: &InfoMap) -> Option<InfoMap>;
}

/// Requires a fixed set of non-blank keys and adds `External-Identifier`
#[derive(Debug, Clone)]
pub struct RequiredKeysAcceptance {
    required: Vec<String>,
}

impl RequiredKeysAcceptance {
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    /// Required keys that are absent or blank in `metadata`
    pub fn missing_keys(&self, metadata: &InfoMap) -> Vec<String> {
        self.required
            .iter()
            .filter(|key| metadata.get(key).map_or(true, |v| v.trim().is_empty()))
            .cloned()
            .collect()
    }
}

impl MetadataAcceptance for RequiredKeysAcceptance {
    fn accept(&self, metadata: &InfoMap) -> Option<InfoMap> {
        let missing = self.missing_keys(metadata);
        if !missing.is_empty() {
            tracing::debug!(missing = ?missing, "Metadata is missing required keys");
            return None;
        }

        let mut accepted = metadata.clone();
        if accepted
            .get(EXTERNAL_IDENTIFIER)
            .map_or(true, |v| v.trim().is_empty())
        {
            accepted.insert(EXTERNAL_IDENTIFIER, Uuid::new_v4().to_string());
        }
        Some(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acceptance() -> RequiredKeysAcceptance {
        RequiredKeysAcceptance::new(["Source-Organization"])
    }

    #[test]
    fn test_accepts_and_adds_identifier() {
        let metadata: InfoMap = [("Source-Organization", "X")].into_iter().collect();
        let accepted = acceptance().accept(&metadata).unwrap();
        let token = accepted.get(EXTERNAL_IDENTIFIER).unwrap();
        assert!(Uuid::parse_str(token).is_ok());
        assert_eq!(accepted.get("Source-Organization"), Some("X"));
    }

    #[test]
    fn test_keeps_supplied_identifier() {
        let metadata: InfoMap = [
            ("Source-Organization", "X"),
            (EXTERNAL_IDENTIFIER, "accession-42"),
        ]
        .into_iter()
        .collect();
        let accepted = acceptance().accept(&metadata).unwrap();
        assert_eq!(accepted.get(EXTERNAL_IDENTIFIER), Some("accession-42"));
    }

    #[test]
    fn test_rejects_missing_or_blank_keys() {
        assert!(acceptance().accept(&InfoMap::new()).is_none());
        let blank: InfoMap = [("Source-Organization", "  ")].into_iter().collect();
        assert!(acceptance().accept(&blank).is_none());
        assert_eq!(acceptance().missing_keys(&blank), vec!["Source-Organization"]);
    }
}
