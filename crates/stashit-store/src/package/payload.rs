//! Payload scanning and file hashing

use crate::errors::{io_error, packaging_error, Result};
use sha2::{Digest, Sha256};
use stashit_core::model::{ManifestEntry, PayloadOxum};
use std::fs::File;
use std::path::{Component, Path};
use walkdir::WalkDir;

use super::PAYLOAD_DIR;

/// Hex sha256 of a file's content
pub(crate) fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Package-relative path with `/` separators (`data/sub/file.txt`)
pub(crate) fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Every regular file under `<root>/data`, as package-relative paths, sorted.
///
/// Symbolic links are not followed into directories; a link to a file counts
/// as that file.
pub(crate) fn payload_files(root: &Path) -> Result<Vec<(String, u64)>> {
    let data_dir = root.join(PAYLOAD_DIR);
    let mut files = Vec::new();
    if !data_dir.is_dir() {
        return Ok(files);
    }

    for entry in WalkDir::new(&data_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            packaging_error("scan_payload", &data_dir, format!("cannot walk payload: {}", e))
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let rel = relative_path(root, path).ok_or_else(|| {
            packaging_error("scan_payload", path, "payload path is not valid UTF-8")
        })?;
        let len = path
            .metadata()
            .map_err(|e| io_error("scan_payload", e).with_path(path))?
            .len();
        files.push((rel, len));
    }
    Ok(files)
}

/// Hash every payload file into manifest entries and total the payload
pub(crate) fn hash_payload(root: &Path) -> Result<(Vec<ManifestEntry>, PayloadOxum)> {
    let mut entries = Vec::new();
    let mut oxum = PayloadOxum::default();
    for (rel, len) in payload_files(root)? {
        let path = root.join(&rel);
        let digest = sha256_file(&path).map_err(|e| io_error("hash_payload", e).with_path(&path))?;
        entries.push(ManifestEntry::new(rel, digest));
        oxum.add_file(len);
    }
    Ok((entries, oxum))
}
