#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # Capability Configuration Errors
//!
//! Every error here is a build-time failure: once a
//! [`CapabilitySet`](crate::CapabilitySet) exists, none of them can occur.
//! Errors carry the offending identifier or invariant so the build
//! orchestrator can surface them verbatim.

use std::fmt;

use thiserror::Error;

use crate::invariant::Invariant;

/// Stable error codes for classifying configuration failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// An identifier outside the recognized capability table was referenced.
    UnknownCapability = 7101,
    /// The resolved selection violates a coherence invariant.
    ConflictingSelection = 7102,
    /// Persisted artifact bytes could not be parsed into directives.
    MalformedArtifact = 7103,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::UnknownCapability => write!(f, "UNKNOWN_CAPABILITY"),
            ErrorCode::ConflictingSelection => write!(f, "CONFLICTING_SELECTION"),
            ErrorCode::MalformedArtifact => write!(f, "MALFORMED_ARTIFACT"),
        }
    }
}

/// Errors raised while resolving, validating or loading a capability set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Identifier is not one of the recognized capabilities
    #[error("unknown capability `{identifier}`")]
    UnknownCapability {
        /// The identifier or artifact symbol as it was supplied.
        identifier: String,
    },

    /// Resolved values violate an invariant
    #[error("conflicting capability selection: {invariant}")]
    ConflictingSelection {
        /// The first invariant found violated.
        invariant: Invariant,
    },

    /// Artifact bytes are not a well-formed capability header
    #[error("malformed capability artifact{}: {reason}", fmt_line(.line))]
    MalformedArtifact {
        /// 1-based line number where parsing stopped, if known.
        line: Option<usize>,
        /// What was wrong.
        reason: String,
    },
}

fn fmt_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" (line {l})")).unwrap_or_default()
}

impl ConfigError {
    /// Build an [`ConfigError::UnknownCapability`] for `identifier`.
    pub fn unknown(identifier: impl Into<String>) -> Self {
        ConfigError::UnknownCapability { identifier: identifier.into() }
    }

    /// Build a [`ConfigError::MalformedArtifact`] pointing at `line`.
    pub fn malformed(line: Option<usize>, reason: impl Into<String>) -> Self {
        ConfigError::MalformedArtifact { line, reason: reason.into() }
    }

    /// Classification code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::UnknownCapability { .. } => ErrorCode::UnknownCapability,
            ConfigError::ConflictingSelection { .. } => ErrorCode::ConflictingSelection,
            ConfigError::MalformedArtifact { .. } => ErrorCode::MalformedArtifact,
        }
    }
}

impl From<Invariant> for ConfigError {
    fn from(invariant: Invariant) -> Self {
        ConfigError::ConflictingSelection { invariant }
    }
}

/// Result alias for capability configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
