#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Errors raised while generating or loading the capability artifact.

use std::path::PathBuf;

use thiserror::Error;
use tlscaps_core::ConfigError;

/// Failure of a generation step; any of these must stop the build
#[derive(Debug, Error)]
pub enum BuildError {
    /// Capability resolution or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Override file is not a JSON object of booleans.
    #[error("invalid override file {}: {source}", .path.display())]
    OverrideFile {
        /// The override file.
        path: PathBuf,
        /// Parse error.
        #[source]
        source: serde_json::Error,
    },

    /// An override value could not be read as a boolean.
    #[error("invalid value `{value}` for override `{key}` (expected 1/0, true/false, yes/no, on/off)")]
    InvalidOverride {
        /// Variable or key that carried the value.
        key: String,
        /// The rejected value.
        value: String,
    },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io { path: path.into(), source }
    }

    /// The capability error behind this failure, if any.
    #[must_use]
    pub fn config_error(&self) -> Option<&ConfigError> {
        match self {
            BuildError::Config(e) => Some(e),
            _ => None,
        }
    }
}

/// Result alias for generation operations.
pub type Result<T> = std::result::Result<T, BuildError>;
