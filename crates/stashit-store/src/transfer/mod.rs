//! File transfer methods for archival copies
//!
//! A [`FileTransfer`] copies the contents of a source directory into an
//! existing destination directory, recursively, preserving modification
//! times and symbolic links.

mod native;
mod rsync;

pub use native::NativeTransfer;
pub use rsync::RsyncTransfer;

use crate::errors::Result;
use stashit_core::errors::{ExError, ExErrorKind};
use std::path::Path;
use std::str::FromStr;

/// Copies a directory's contents into a destination directory
pub trait FileTransfer: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Copy everything under `source` into `destination`.
    ///
    /// ## Errors
    ///
    /// Any failure to copy; the destination may then be partially written.
    fn transfer(&self, source: &Path, destination: &Path) -> Result<()>;
}

/// Selectable transfer method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMethod {
    /// External `rsync -rlt`
    #[default]
    Rsync,
    /// In-process recursive copy
    Native,
}

impl TransferMethod {
    pub fn build(self) -> Box<dyn FileTransfer> {
        match self {
            TransferMethod::Rsync => Box::new(RsyncTransfer::default()),
            TransferMethod::Native => Box::new(NativeTransfer),
        }
    }
}

impl std::fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferMethod::Rsync => write!(f, "rsync"),
            TransferMethod::Native => write!(f, "native"),
        }
    }
}

impl FromStr for TransferMethod {
    type Err = ExError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rsync" => Ok(TransferMethod::Rsync),
            "native" => Ok(TransferMethod::Native),
            other => Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_transfer_method")
                .with_message(format!(
                    "unknown transfer method '{}' (expected rsync or native)",
                    other
                ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transfer_method() {
        assert_eq!("rsync".parse::<TransferMethod>().unwrap(), TransferMethod::Rsync);
        assert_eq!(" Native ".parse::<TransferMethod>().unwrap(), TransferMethod::Native);
        let err = "scp".parse::<TransferMethod>().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_default_is_rsync() {
        assert_eq!(TransferMethod::default(), TransferMethod::Rsync);
        assert_eq!(TransferMethod::default().build().name(), "rsync");
        assert_eq!(TransferMethod::Native.build().name(), "native");
    }
}
