//! Error types for the brushport library.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for translation operations.
///
/// Only [`Error::Parse`], [`Error::Io`] and the wrapped decoder errors ever
/// abort a single material. [`Error::UnresolvedReference`] and
/// [`Error::UnmappedProperty`] are recorded as warnings next to an inline
/// marker in the emitted document.
#[derive(Error, Debug)]
pub enum Error {
    /// Document has no recognizable material block
    #[error("Parse error in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Identifier or name absent from the resolution index
    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),

    /// Parameter, slot or directive without a translation rule
    #[error("Unmapped property: {0}")]
    UnmappedProperty(String),

    /// File unreadable, unwritable or uncopyable
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML decoding error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create a parse error for a document.
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Attach a path to an I/O error.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for per-property issues that never abort a material.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::UnresolvedReference(_) | Self::UnmappedProperty(_))
    }
}

/// Result type alias for translation operations.
pub type Result<T> = std::result::Result<T, Error>;
