//! Structured logging for stashit runs
//!
//! Every pipeline stage reports through the same three events (`start`,
//! `end`, `end_error`) keyed by `op`, so a day's log file can be filtered per
//! stage or per identity. The subscriber is installed once per process:
//! `init_to_dir` when the configured log directory exists, `init` otherwise.
//!
//! ```rust
//! use stashit_core::logging_facility::{init, Profile};
//! use stashit_core::log_op_start;
//!
//! init(Profile::Development);
//! log_op_start!("archive", identity = "coll1");
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, init_to_dir, log_file_path, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
