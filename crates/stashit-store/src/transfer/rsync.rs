use super::FileTransfer;
use crate::errors::Result;
use stashit_core::errors::{ExError, ExErrorKind};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Copies with the external `rsync -rlt` (recursive, links as links, times)
#[derive(Debug, Clone)]
pub struct RsyncTransfer {
    program: PathBuf,
}

impl RsyncTransfer {
    /// Use a specific rsync executable
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for RsyncTransfer {
    fn default() -> Self {
        Self::with_program("rsync")
    }
}

impl FileTransfer for RsyncTransfer {
    fn name(&self) -> &'static str {
        "rsync"
    }

    fn transfer(&self, source: &Path, destination: &Path) -> Result<()> {
        // Trailing slash: copy the contents, not the directory itself
        let mut from = OsString::from(source.as_os_str());
        from.push("/");

        let output = Command::new(&self.program)
            .arg("-rlt")
            .arg(&from)
            .arg(destination)
            .output()
            .map_err(|e| {
                ExError::new(ExErrorKind::ExternalService)
                    .with_op("rsync")
                    .with_path(source)
                    .with_message(format!("cannot run {}: {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            return Err(ExError::new(ExErrorKind::ExternalService)
                .with_op("rsync")
                .with_path(source)
                .with_message(format!(
                    "rsync exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
        }

        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            "rsync completed"
        );
        Ok(())
    }
}
