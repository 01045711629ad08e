//! Migration checksums
//!
//! Line endings are normalised before hashing so a checkout with CRLF
//! endings records the same checksum as the embedded LF text.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of migration SQL with `\r\n` folded to `\n`
pub fn migration_checksum(sql: &str) -> String {
    let normalised = sql.replace("\r\n", "\n");
    hex::encode(Sha256::digest(normalised.as_bytes()))
}
