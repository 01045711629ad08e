use super::FileTransfer;
use crate::errors::{io_error, Result};
use filetime::FileTime;
use stashit_core::errors::{ExError, ExErrorKind};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// In-process recursive copy preserving modification times and symlinks
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTransfer;

impl FileTransfer for NativeTransfer {
    fn name(&self) -> &'static str {
        "native"
    }

    fn transfer(&self, source: &Path, destination: &Path) -> Result<()> {
        // Directory times are applied last, deepest first, since writing
        // children updates them.
        let mut dir_times: Vec<(PathBuf, FileTime)> = Vec::new();

        for entry in WalkDir::new(source).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                ExError::new(ExErrorKind::Io)
                    .with_op("native_transfer")
                    .with_path(source)
                    .with_message(e.to_string())
            })?;
            let rel = entry.path().strip_prefix(source).map_err(|e| {
                ExError::new(ExErrorKind::Internal)
                    .with_op("native_transfer")
                    .with_path(entry.path())
                    .with_message(e.to_string())
            })?;
            let target = destination.join(rel);
            let meta = entry
                .path()
                .symlink_metadata()
                .map_err(|e| io_error("native_transfer", e).with_path(entry.path()))?;
            let mtime = FileTime::from_last_modification_time(&meta);
            let file_type = meta.file_type();

            if file_type.is_dir() {
                fs::create_dir_all(&target)
                    .map_err(|e| io_error("native_transfer", e).with_path(&target))?;
                dir_times.push((target, mtime));
            } else if file_type.is_symlink() {
                copy_symlink(entry.path(), &target, mtime)?;
            } else {
                fs::copy(entry.path(), &target)
                    .map_err(|e| io_error("native_transfer", e).with_path(&target))?;
                filetime::set_file_mtime(&target, mtime)
                    .map_err(|e| io_error("native_transfer", e).with_path(&target))?;
            }
        }

        for (dir, mtime) in dir_times.iter().rev() {
            filetime::set_file_mtime(dir, *mtime)
                .map_err(|e| io_error("native_transfer", e).with_path(dir))?;
        }

        Ok(())
    }
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path, mtime: FileTime) -> Result<()> {
    let points_to = fs::read_link(link).map_err(|e| io_error("native_transfer", e).with_path(link))?;
    if target.symlink_metadata().is_ok() {
        fs::remove_file(target).map_err(|e| io_error("native_transfer", e).with_path(target))?;
    }
    std::os::unix::fs::symlink(&points_to, target)
        .map_err(|e| io_error("native_transfer", e).with_path(target))?;
    filetime::set_symlink_file_times(target, mtime, mtime)
        .map_err(|e| io_error("native_transfer", e).with_path(target))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, _target: &Path, _mtime: FileTime) -> Result<()> {
    Err(ExError::new(ExErrorKind::ExternalService)
        .with_op("native_transfer")
        .with_path(link)
        .with_message("symbolic links are only copied on unix"))
}
