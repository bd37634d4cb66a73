//! Error types for rust-ddl-import

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while importing DDL
///
/// Syntactic noise in the DDL itself is never an error: unparseable clauses and
/// statements are skipped by the extractors. These variants cover I/O and the
/// fatal pipeline failures only.
#[derive(Error, Debug)]
pub enum DdlImportError {
    #[error("Failed to read DDL file: {path}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("DDL file is neither UTF-8 nor Windows-1252: {path}")]
    FileDecodeError { path: PathBuf },

    #[error("error parsing DDL: {message}")]
    DdlParseError { message: String },

    #[error("Failed to write schema model to {path}")]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize schema model: {message}")]
    SerializeError { message: String },
}

impl From<serde_json::Error> for DdlImportError {
    fn from(err: serde_json::Error) -> Self {
        DdlImportError::SerializeError {
            message: err.to_string(),
        }
    }
}
