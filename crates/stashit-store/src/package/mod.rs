//! Package Adapter (BagIt 1.0 on-disk packages)
//!
//! Layout of a package rooted at `<dir>`:
//!
//! ```text
//! <dir>/bagit.txt                 version declaration
//! <dir>/bag-info.txt              ordered `Key: Value` descriptive info
//! <dir>/manifest-sha256.txt       `<sha256>  data/<path>` per payload file
//! <dir>/tagmanifest-sha256.txt    checksums of the three tag files above
//! <dir>/data/...                  payload
//! ```
//!
//! Tag files are replaced atomically. `bag-info.txt` is always written before
//! `tagmanifest-sha256.txt`, so a save interrupted between the two leaves a
//! package whose tag manifest no longer matches, and which reports invalid.

mod bag;
mod payload;
mod validate;

pub use bag::{open_or_create, Package};
pub use validate::{ValidationProblem, Validity};

pub const BAGIT_TXT: &str = "bagit.txt";
pub const BAG_INFO_TXT: &str = "bag-info.txt";
pub const MANIFEST_TXT: &str = "manifest-sha256.txt";
pub const TAGMANIFEST_TXT: &str = "tagmanifest-sha256.txt";
pub const PAYLOAD_DIR: &str = "data";

/// Contents of `bagit.txt`
pub const BAGIT_DECLARATION: &str = "BagIt-Version: 1.0\nTag-File-Character-Encoding: UTF-8\n";

/// Tag files covered by the tag manifest, in order
pub(crate) const TAG_FILES: [&str; 3] = [BAGIT_TXT, BAG_INFO_TXT, MANIFEST_TXT];
