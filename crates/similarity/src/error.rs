//! Error types for the similarity crate.
//!
//! Missing data (tiny corpus, unknown movie, seeds with no neighbours) is
//! never an error here; the only failure is not being able to read the
//! corpus at all.

use data_loader::DataLoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The store read behind a rebuild failed; the previous index stays in effect
    #[error("Failed to fetch movie corpus: {0}")]
    CorpusFetch(#[from] DataLoadError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
