//! Shared error definitions for pack construction.

use std::path::PathBuf;

use thiserror::Error;

use crate::path::FieldPath;

/// Result alias used while building the document model.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort construction of a [`Pack`](crate::Pack).
///
/// No partially-valid pack is ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum Error {
    /// The pack source is not well-formed JSON or YAML.
    #[error("failed to parse pack source: {message}")]
    Parse {
        /// Human-readable description of the syntax problem.
        message: String,
    },

    /// The pack file could not be read.
    #[error("failed to read pack file `{}`: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A field failed schema or type validation.
    #[error("invalid pack field `{path}`: {reason}")]
    Validation {
        /// Location of the offending field.
        path: FieldPath,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A validator entry names an unknown type or carries malformed params.
    #[error("invalid validator configuration at `{path}`: {reason}")]
    Configuration {
        /// Location of the offending validator field.
        path: FieldPath,
        /// Human-readable reason for rejection.
        reason: String,
    },
}

impl Error {
    /// Creates a [`Error::Parse`] from the supplied message.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates a [`Error::Validation`] for the supplied field.
    #[must_use]
    pub fn validation(path: &FieldPath, reason: impl Into<String>) -> Self {
        Self::Validation {
            path: path.clone(),
            reason: reason.into(),
        }
    }

    /// Creates a [`Error::Configuration`] for the supplied field.
    #[must_use]
    pub fn configuration(path: &FieldPath, reason: impl Into<String>) -> Self {
        Self::Configuration {
            path: path.clone(),
            reason: reason.into(),
        }
    }

    /// Returns the field path for validation and configuration errors.
    #[must_use]
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Self::Validation { path, .. } | Self::Configuration { path, .. } => Some(path),
            Self::Parse { .. } | Self::Io { .. } => None,
        }
    }
}
