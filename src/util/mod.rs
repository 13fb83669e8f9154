//! Utility types and functions shared across the pipeline.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`format`] helpers - number, path and string formatting for emitted text

mod error;
pub mod format;

pub use error::*;
