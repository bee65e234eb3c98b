//! NF-000: Error taxonomy for the composition pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, validating, or exporting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource name cannot be used as a Terraform block key
    #[error("invalid resource name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A representation did not have the expected nested shape
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),

    /// Directory creation, read, write, or rename failed
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON encode/decode failure
    #[error("JSON error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Generation config could not be parsed
    #[error("config error: {0}")]
    Config(String),

    /// One or more validation messages
    #[error("{} validation error(s)", .0.len())]
    Validation(Vec<String>),
}

impl Error {
    /// Wrap an I/O error with the path it occurred on.
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn mismatch(msg: impl Into<String>) -> Self {
        Self::StructuralMismatch(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
