use super::payload::{payload_files, sha256_file};
use super::{Package, BAGIT_TXT, MANIFEST_TXT, TAGMANIFEST_TXT};
use stashit_core::model::info::PAYLOAD_OXUM;
use stashit_core::model::manifest::parse_manifest;
use stashit_core::model::PayloadOxum;
use std::collections::BTreeSet;
use std::fmt;

/// One reason a package is not structurally valid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationProblem {
    MissingTagFile(String),
    MissingPayloadFile(String),
    UnreadableFile { path: String, reason: String },
    ChecksumMismatch { path: String, expected: String, actual: String },
    UnlistedPayloadFile(String),
    OxumMismatch { expected: String, actual: String },
    TagChecksumMismatch { path: String, expected: String, actual: String },
    MalformedTagManifest(String),
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTagFile(p) => write!(f, "missing tag file {}", p),
            Self::MissingPayloadFile(p) => write!(f, "missing payload file {}", p),
            Self::UnreadableFile { path, reason } => write!(f, "cannot read {}: {}", path, reason),
            Self::ChecksumMismatch {
                path,
                expected,
                actual,
            } => write!(f, "{} expected sha256 {} found {}", path, expected, actual),
            Self::UnlistedPayloadFile(p) => write!(f, "payload file {} not in manifest", p),
            Self::OxumMismatch { expected, actual } => {
                write!(f, "Payload-Oxum is {} but payload is {}", expected, actual)
            }
            Self::TagChecksumMismatch {
                path,
                expected,
                actual,
            } => write!(f, "tag file {} expected sha256 {} found {}", path, expected, actual),
            Self::MalformedTagManifest(reason) => write!(f, "malformed tag manifest: {}", reason),
        }
    }
}

/// Result of validating a package: valid when there are no problems
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validity {
    problems: Vec<ValidationProblem>,
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn problems(&self) -> &[ValidationProblem] {
        &self.problems
    }

    /// Problems joined into one line for logs and error messages
    pub fn summary(&self) -> String {
        self.problems
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl Package {
    /// Check the package against its on-disk state
    ///
    /// Tag files must exist, every manifest entry must match its file,
    /// every payload file must be listed, `Payload-Oxum` (when present) must
    /// match the payload, and every tag manifest entry must match.
    pub fn validate(&self) -> Validity {
        let mut problems = Vec::new();
        let root = self.root();

        for tag in [BAGIT_TXT, MANIFEST_TXT, TAGMANIFEST_TXT] {
            if !root.join(tag).is_file() {
                problems.push(ValidationProblem::MissingTagFile(tag.to_string()));
            }
        }

        let mut listed = BTreeSet::new();
        for entry in self.entries() {
            listed.insert(entry.path.clone());
            let path = root.join(&entry.path);
            if !path.is_file() {
                problems.push(ValidationProblem::MissingPayloadFile(entry.path.clone()));
                continue;
            }
            match sha256_file(&path) {
                Ok(actual) if actual == entry.digest => {}
                Ok(actual) => problems.push(ValidationProblem::ChecksumMismatch {
                    path: entry.path.clone(),
                    expected: entry.digest.clone(),
                    actual,
                }),
                Err(e) => problems.push(ValidationProblem::UnreadableFile {
                    path: entry.path.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        match payload_files(root) {
            Ok(files) => {
                let mut actual = PayloadOxum::default();
                for (rel, len) in files {
                    actual.add_file(len);
                    if !listed.contains(&rel) {
                        problems.push(ValidationProblem::UnlistedPayloadFile(rel));
                    }
                }
                if let Some(expected) = self.info().get(PAYLOAD_OXUM) {
                    let matches = expected
                        .parse::<PayloadOxum>()
                        .map(|oxum| oxum == actual)
                        .unwrap_or(false);
                    if !matches {
                        problems.push(ValidationProblem::OxumMismatch {
                            expected: expected.to_string(),
                            actual: actual.to_string(),
                        });
                    }
                }
            }
            Err(e) => problems.push(ValidationProblem::UnreadableFile {
                path: super::PAYLOAD_DIR.to_string(),
                reason: e.message().to_string(),
            }),
        }

        self.check_tag_manifest(&mut problems);

        Validity { problems }
    }

    fn check_tag_manifest(&self, problems: &mut Vec<ValidationProblem>) {
        let root = self.root();
        let Ok(text) = std::fs::read_to_string(root.join(TAGMANIFEST_TXT)) else {
            // Reported above as a missing tag file
            return;
        };
        let entries = match parse_manifest(&text) {
            Ok(entries) => entries,
            Err(e) => {
                problems.push(ValidationProblem::MalformedTagManifest(e.to_string()));
                return;
            }
        };
        for entry in entries {
            let path = root.join(&entry.path);
            if !path.is_file() {
                problems.push(ValidationProblem::MissingTagFile(entry.path));
                continue;
            }
            match sha256_file(&path) {
                Ok(actual) if actual == entry.digest => {}
                Ok(actual) => problems.push(ValidationProblem::TagChecksumMismatch {
                    path: entry.path,
                    expected: entry.digest,
                    actual,
                }),
                Err(e) => problems.push(ValidationProblem::UnreadableFile {
                    path: entry.path,
                    reason: e.to_string(),
                }),
            }
        }
    }
}
