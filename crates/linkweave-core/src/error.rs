//! Error types for link analysis and resolution.
//!
//! All hard failures are represented by the [`Error`] enum. Soft failures
//! (unresolved targets, parent-directory overflow, missing sections) are
//! ordinary values and never show up here.

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type for all linkweave operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Raw link text does not match the selected grammar
    #[error("Malformed link syntax in {raw:?}: {reason}")]
    MalformedLinkSyntax { raw: String, reason: String },

    /// Link kind the analyzer or edit generator cannot handle
    #[error("Link of kind {kind} is not supported")]
    UnsupportedLinkKind { kind: String },

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a malformed link error
    pub fn malformed(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedLinkSyntax {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported link kind error
    pub fn unsupported_kind(kind: impl std::fmt::Display) -> Self {
        Error::UnsupportedLinkKind {
            kind: kind.to_string(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }
}
