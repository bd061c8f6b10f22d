//! # Data Loader Crate
//!
//! This crate owns the movie corpus that recommendations are computed from.
//!
//! ## Main Components
//!
//! - **types**: Movie documents and the `MovieId` alias
//! - **parser**: Parse JSON / JSON Lines catalog files into documents
//! - **store**: The `MovieStore` seam and an in-memory implementation
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{InMemoryStore, MovieStore};
//! use std::path::Path;
//!
//! let store = InMemoryStore::load_from_file(Path::new("data/movies.json"))?;
//! let movies = store.fetch_all_movies()?;
//! println!("Catalog holds {} movies", movies.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod store;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use store::{InMemoryStore, MovieStore};
pub use types::{MovieDocument, MovieId};
