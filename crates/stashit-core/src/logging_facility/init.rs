//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Suffix of the daily transfer log file name
pub const LOG_FILE_SUFFIX: &str = "_stash-it_transfer.log";

/// Path of the log file for `date` inside `log_dir` (`YYYYMMDD_stash-it_transfer.log`)
pub fn log_file_path(log_dir: &Path, date: chrono::NaiveDate) -> PathBuf {
    log_dir.join(format!("{}{}", date.format("%Y%m%d"), LOG_FILE_SUFFIX))
}

/// Initialize the logging facility writing to stderr
///
/// This function should be called once at application startup.
///
/// # Profiles
///
/// - **Development**: Human-readable logs with debug level
/// - **Production**: JSON structured logs with info level
/// - **Test**: Capture mode for test assertions
///
/// # Example
///
/// ```
/// use stashit_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    install(profile, None);
}

/// Initialize the logging facility appending to today's file in `log_dir`
///
/// Returns the path of the log file in use.
///
/// # Errors
///
/// Returns the I/O error if the log file cannot be opened for appending.
pub fn init_to_dir(profile: Profile, log_dir: &Path) -> std::io::Result<PathBuf> {
    let path = log_file_path(log_dir, chrono::Local::now().date_naive());
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    install(profile, Some(file));
    Ok(path)
}

fn install(profile: Profile, file: Option<File>) {
    INIT_ONCE.call_once(move || match profile {
        Profile::Development => {
            let builder = tracing_subscriber::fmt().with_env_filter(filter_or("stashit=debug"));
            let _ = match file {
                Some(file) => builder
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .finish()
                    .try_init(),
                None => builder.with_writer(std::io::stderr).finish().try_init(),
            };
        }
        Profile::Production => {
            let builder = tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter_or("stashit=info"));
            let _ = match file {
                Some(file) => builder.with_writer(Mutex::new(file)).finish().try_init(),
                None => builder.with_writer(std::io::stderr).finish().try_init(),
            };
        }
        Profile::Test => {
            // Test capture is initialized separately via init_test_capture()
            let _ = tracing_subscriber::registry().try_init();
        }
    });
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        // Multiple calls should not panic
        init(Profile::Test);
        init(Profile::Test);
        init(Profile::Test);
    }

    #[test]
    fn test_profile_equality() {
        assert_eq!(Profile::Development, Profile::Development);
        assert_ne!(Profile::Development, Profile::Production);
    }

    #[test]
    fn test_log_file_path_is_dated() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let path = log_file_path(Path::new("/var/log/stash"), date);
        assert_eq!(
            path,
            PathBuf::from("/var/log/stash/20260309_stash-it_transfer.log")
        );
    }

    #[test]
    fn test_init_to_dir_creates_log_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = init_to_dir(Profile::Test, dir.path()).unwrap();
        assert!(path.exists());
        assert!(path.starts_with(dir.path()));
    }
}
