//! # Similarity Crate
//!
//! Content-based movie recommendations: every movie's text is turned into a
//! TF-IDF vector and neighbours are ranked by cosine similarity.
//!
//! ## Components
//!
//! ### Corpus Indexer
//! - Builds a composite text per movie (title, overview, genres, keywords)
//! - Fits a unigram + bigram TF-IDF vocabulary with a minimum document
//!   frequency and an English stop-word list
//! - Publishes (vectorizer, matrix, id order) as one immutable [`FittedIndex`]
//!
//! ### Similarity Engine
//! - `similar_to`: top-N neighbours of one movie, lazily fitting the index
//! - `aggregate_similar`: neighbours of several seed movies merged by best
//!   score, never returning a seed
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::InMemoryStore;
//! use similarity::{DEFAULT_TOP_N, EngineConfig, SimilarityEngine};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryStore::load_from_file("data/movies.json".as_ref())?);
//! let engine = SimilarityEngine::with_config(
//!     store,
//!     EngineConfig::default().with_min_doc_frequency(2),
//! );
//!
//! engine.rebuild()?;
//! let neighbours = engine.similar_to(603, DEFAULT_TOP_N)?;
//! let personalized = engine.aggregate_similar(&[603, 604], 20);
//! ```

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod stop_words;
pub mod text;
pub mod types;
pub mod vectorizer;

// Re-export commonly used types
pub use aggregate::{aggregate_similar, SimilaritySource};
pub use config::{EngineConfig, DEFAULT_TOP_N};
pub use engine::SimilarityEngine;
pub use error::{EngineError, Result};
pub use index::FittedIndex;
pub use types::ScoredMovie;
pub use vectorizer::{SparseVector, TfidfVectorizer};
