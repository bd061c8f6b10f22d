//! Result types shared by the indexer, the engine and the aggregator.

use data_loader::MovieId;
use serde::{Deserialize, Serialize};

/// A movie paired with its similarity score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    pub score: f32,
}

impl ScoredMovie {
    pub fn new(movie_id: MovieId, score: f32) -> Self {
        Self { movie_id, score }
    }
}
