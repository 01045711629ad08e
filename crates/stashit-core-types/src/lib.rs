//! Core types shared across stashit facilities
//!
//! This crate provides foundational types used by both error handling
//! and logging facilities:
//!
//! - **Correlation types**: RunId
//! - **Schema constants**: canonical event names

pub mod correlation;
pub mod schema;

pub use correlation::RunId;
