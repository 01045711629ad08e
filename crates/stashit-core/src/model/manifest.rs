use crate::errors::{Result, StashError};
use serde::{Deserialize, Serialize};

/// One line of a checksum manifest: a hex digest and a package-relative path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub digest: String,
}

impl ManifestEntry {
    pub fn new(path: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            digest: digest.into(),
        }
    }
}

/// Parse manifest text (`<digest>  <path>` per line).
///
/// Any run of whitespace separates digest from path. Paths are
/// percent-decoded for `%0A`, `%0D` and `%25`.
pub fn parse_manifest(text: &str) -> Result<Vec<ManifestEntry>> {
    let mut entries = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let invalid = || StashError::InvalidManifestLine {
            line_no: index + 1,
            line: line.to_string(),
        };

        let (digest, rest) = line.split_once(char::is_whitespace).ok_or_else(invalid)?;
        let path = rest.trim_start();
        if digest.is_empty() || path.is_empty() {
            return Err(invalid());
        }
        entries.push(ManifestEntry::new(decode_path(path), digest.to_ascii_lowercase()));
    }
    Ok(entries)
}

/// Render manifest text, sorted by path, two spaces between digest and path
pub fn format_manifest(entries: &[ManifestEntry]) -> String {
    let mut sorted: Vec<&ManifestEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut out = String::new();
    for entry in sorted {
        out.push_str(&entry.digest);
        out.push_str("  ");
        out.push_str(&encode_path(&entry.path));
        out.push('\n');
    }
    out
}

fn encode_path(path: &str) -> String {
    path.replace('%', "%25")
        .replace('\n', "%0A")
        .replace('\r', "%0D")
}

fn decode_path(path: &str) -> String {
    path.replace("%0A", "\n")
        .replace("%0a", "\n")
        .replace("%0D", "\r")
        .replace("%0d", "\r")
        .replace("%25", "%")
}
