//! Error types for Kiln
//!
//! Uses `thiserror` for library errors. Problems in the compiled project are
//! never errors; they are reported as diagnostics.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::entities::Diagnostic;

/// Result type alias for Kiln operations
pub type KilnResult<T> = Result<T, KilnError>;

/// Main error type for Kiln operations
#[derive(Error, Debug)]
pub enum KilnError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML or does not match the schema
    #[error("invalid configuration in {file}: {message}")]
    ConfigParse { file: PathBuf, message: String },

    /// Configuration file named on the command line does not exist
    #[error("configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// File watching could not be set up
    #[error("watch error: {message}")]
    Watch { message: String },

    /// A diagnostic that stops the run before any program is built
    #[error("{message}")]
    Unrecoverable { code: u32, message: String },
}

impl From<&Diagnostic> for KilnError {
    fn from(diagnostic: &Diagnostic) -> Self {
        KilnError::Unrecoverable {
            code: diagnostic.code(),
            message: diagnostic.message_text().flatten("\n"),
        }
    }
}

impl From<notify::Error> for KilnError {
    fn from(err: notify::Error) -> Self {
        KilnError::Watch {
            message: err.to_string(),
        }
    }
}
