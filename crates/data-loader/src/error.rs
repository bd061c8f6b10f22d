//! Error types for the data-loader crate.
//!
//! Every failure to read the movie corpus ends up as a [`DataLoadError`],
//! whether it comes from a catalog file on disk or from a store backend.

use thiserror::Error;

use crate::types::MovieId;

/// Errors that can occur while loading or reading movie documents
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// Catalog file could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A catalog entry couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// Two documents in one catalog share an identifier
    #[error("Duplicate movie id {id} in catalog")]
    DuplicateMovie { id: MovieId },

    /// The backing store could not answer a read
    #[error("Movie store unavailable: {0}")]
    StoreUnavailable(String),

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
