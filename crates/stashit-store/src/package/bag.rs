use super::payload::{hash_payload, sha256_file};
use super::{
    BAGIT_DECLARATION, BAGIT_TXT, BAG_INFO_TXT, MANIFEST_TXT, PAYLOAD_DIR, TAGMANIFEST_TXT,
    TAG_FILES,
};
use crate::atomic::{atomic_write, temp_path_for};
use crate::errors::{io_error, packaging_error, Result};
use stashit_core::errors::ExError;
use stashit_core::model::info::{BAGGING_DATE, PAYLOAD_OXUM};
use stashit_core::model::manifest::{format_manifest, parse_manifest};
use stashit_core::model::{InfoMap, ManifestEntry, PayloadOxum};
use std::fs;
use std::path::{Path, PathBuf};

const BAG_SOFTWARE_AGENT: &str = "Bag-Software-Agent";
const TEMP_PAYLOAD_PREFIX: &str = ".stashit-payload-";

/// An archival package on disk
#[derive(Debug, Clone)]
pub struct Package {
    root: PathBuf,
    info: InfoMap,
    entries: Vec<ManifestEntry>,
}

impl Package {
    /// Open the package at `dir`, or `Ok(None)` if `dir` is not a package.
    ///
    /// ## Errors
    ///
    /// - `ExErrorKind::Packaging`: the tag files exist but cannot be read or parsed
    pub fn open_existing(dir: &Path) -> Result<Option<Package>> {
        if !dir.join(BAGIT_TXT).is_file() {
            return Ok(None);
        }

        let info = match read_optional(&dir.join(BAG_INFO_TXT))? {
            Some(text) => InfoMap::parse(&text).map_err(|e| {
                packaging_error("open_package", dir, "cannot parse bag-info.txt")
                    .with_source(ExError::from(e))
            })?,
            None => InfoMap::new(),
        };

        let entries = match read_optional(&dir.join(MANIFEST_TXT))? {
            Some(text) => parse_manifest(&text).map_err(|e| {
                packaging_error("open_package", dir, "cannot parse manifest-sha256.txt")
                    .with_source(ExError::from(e))
            })?,
            None => Vec::new(),
        };

        Ok(Some(Package {
            root: dir.to_path_buf(),
            info,
            entries,
        }))
    }

    /// Turn the directory `dir` into a new package with `info` as its
    /// descriptive info.
    ///
    /// Every existing entry of `dir` is moved under `data/`. `Bagging-Date` is
    /// added unless supplied; `Payload-Oxum` is always computed. On any
    /// failure `dir` is put back the way it was: tag files written so far are
    /// removed and the payload is moved back out of `data/`.
    ///
    /// ## Errors
    ///
    /// - `ExErrorKind::Packaging`: `dir` is not a directory, or the package
    ///   could not be built; the underlying error is attached as the source
    pub fn create(dir: &Path, info: &InfoMap) -> Result<Package> {
        if !dir.is_dir() {
            return Err(packaging_error(
                "create_package",
                dir,
                "source is not a directory",
            ));
        }

        move_into_payload_dir(dir)?;

        match Self::build_in_place(dir, info) {
            Ok(package) => Ok(package),
            Err(err) => {
                let err = packaging_error("create_package", dir, "cannot build package")
                    .with_source(err);
                if let Err(restore) = restore_from_payload_dir(dir) {
                    tracing::error!(
                        path = %dir.display(),
                        error = %restore,
                        "Could not restore source directory after failed package build"
                    );
                }
                Err(err)
            }
        }
    }

    fn build_in_place(dir: &Path, info: &InfoMap) -> Result<Package> {
        let (entries, oxum) = hash_payload(dir)?;
        let mut info = info.clone();
        if !info.contains_key(BAGGING_DATE) {
            info.insert(
                BAGGING_DATE,
                chrono::Local::now().format("%Y-%m-%d").to_string(),
            );
        }
        if !info.contains_key(BAG_SOFTWARE_AGENT) {
            info.insert(
                BAG_SOFTWARE_AGENT,
                format!("stashit-store {}", env!("CARGO_PKG_VERSION")),
            );
        }
        info.insert(PAYLOAD_OXUM, oxum.to_string());

        let package = Package {
            root: dir.to_path_buf(),
            info,
            entries,
        };
        atomic_write(&dir.join(BAGIT_TXT), BAGIT_DECLARATION.as_bytes())?;
        atomic_write(
            &package.manifest_path(),
            format_manifest(&package.entries).as_bytes(),
        )?;
        package.save()?;

        tracing::debug!(
            path = %dir.display(),
            files = package.entries.len(),
            payload_oxum = %oxum,
            "Created package"
        );

        Ok(package)
    }

    /// Merge `info` into this package's descriptive info, overwriting keys of
    /// the same name. Not persisted until [`Package::save`].
    pub fn merge_info(&mut self, info: &InfoMap) {
        self.info.merge(info);
    }

    /// Persist the descriptive info and refresh the tag manifest.
    pub fn save(&self) -> Result<()> {
        atomic_write(
            &self.root.join(BAG_INFO_TXT),
            self.info.to_text().as_bytes(),
        )?;

        let mut tags = Vec::new();
        for tag in TAG_FILES {
            let path = self.root.join(tag);
            if path.is_file() {
                let digest =
                    sha256_file(&path).map_err(|e| io_error("save_package", e).with_path(&path))?;
                tags.push(ManifestEntry::new(tag, digest));
            }
        }
        atomic_write(
            &self.root.join(TAGMANIFEST_TXT),
            format_manifest(&tags).as_bytes(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn info(&self) -> &InfoMap {
        &self.info
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Path of the payload manifest, the input to fingerprinting
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_TXT)
    }

    /// Payload size summary: the recorded `Payload-Oxum`, or computed from
    /// the payload when the info has none.
    ///
    /// ## Errors
    ///
    /// - `ExErrorKind::InvalidInput`: the recorded value is malformed
    pub fn payload_oxum(&self) -> Result<PayloadOxum> {
        match self.info.get(PAYLOAD_OXUM) {
            Some(value) => Ok(value.parse::<PayloadOxum>()?),
            None => Ok(hash_payload(&self.root)?.1),
        }
    }
}

/// Open the package at `dir` and merge `info` into it, or create one there.
///
/// Returns the persisted package and its validity.
///
/// ## Errors
///
/// - `ExErrorKind::Packaging` / `ExErrorKind::Io`: the package could not be
///   opened, built or persisted
pub fn open_or_create(dir: &Path, info: &InfoMap) -> Result<(Package, super::Validity)> {
    let package = match Package::open_existing(dir)? {
        Some(mut package) => {
            package.merge_info(info);
            package.save()?;
            tracing::debug!(path = %dir.display(), "Updated existing package");
            package
        }
        None => Package::create(dir, info)?,
    };
    let validity = package.validate();
    Ok((package, validity))
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error("read_tag_file", e).with_path(path)),
    }
}

/// Move every entry of `dir` into `dir/data`, via a temporary sibling so an
/// existing entry named `data` is moved too.
fn move_into_payload_dir(dir: &Path) -> Result<()> {
    let temp = dir.join(format!("{}{}", TEMP_PAYLOAD_PREFIX, std::process::id()));
    fs::create_dir(&temp).map_err(|e| {
        packaging_error(
            "create_package",
            dir,
            format!("cannot create temporary payload directory: {}", e),
        )
    })?;

    let mut names = Vec::new();
    let listing = fs::read_dir(dir).map_err(|e| io_error("create_package", e).with_path(dir))?;
    for entry in listing {
        let entry = entry.map_err(|e| io_error("create_package", e).with_path(dir))?;
        if entry.path() != temp {
            names.push(entry.file_name());
        }
    }

    let mut moved = Vec::new();
    for name in names {
        if let Err(e) = fs::rename(dir.join(&name), temp.join(&name)) {
            for back in moved.iter().rev() {
                let _ = fs::rename(temp.join(back), dir.join(back));
            }
            let _ = fs::remove_dir(&temp);
            return Err(packaging_error(
                "create_package",
                dir,
                format!("cannot move {:?} into payload: {}", name, e),
            ));
        }
        moved.push(name);
    }

    fs::rename(&temp, dir.join(PAYLOAD_DIR)).map_err(|e| {
        packaging_error(
            "create_package",
            dir,
            format!("cannot rename payload directory: {}", e),
        )
    })
}

/// Undo [`move_into_payload_dir`] after a failed build: drop any tag files
/// (and their temporaries) and move the entries of `data/` back into `dir`.
fn restore_from_payload_dir(dir: &Path) -> Result<()> {
    for tag in [BAGIT_TXT, BAG_INFO_TXT, MANIFEST_TXT, TAGMANIFEST_TXT] {
        let path = dir.join(tag);
        for file in [temp_path_for(&path), path] {
            match fs::remove_file(&file) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(io_error("restore_source", e).with_path(&file)),
            }
        }
    }

    let temp = dir.join(format!("{}{}", TEMP_PAYLOAD_PREFIX, std::process::id()));
    fs::rename(dir.join(PAYLOAD_DIR), &temp)
        .map_err(|e| io_error("restore_source", e).with_path(dir))?;

    let listing = fs::read_dir(&temp).map_err(|e| io_error("restore_source", e).with_path(&temp))?;
    for entry in listing {
        let entry = entry.map_err(|e| io_error("restore_source", e).with_path(&temp))?;
        let name = entry.file_name();
        fs::rename(temp.join(&name), dir.join(&name))
            .map_err(|e| io_error("restore_source", e).with_path(dir.join(&name)))?;
    }
    fs::remove_dir(&temp).map_err(|e| io_error("restore_source", e).with_path(&temp))
}
