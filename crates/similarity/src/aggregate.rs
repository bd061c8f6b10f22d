//! Multi-seed aggregation for personalized recommendations.
//!
//! ## Algorithm
//! 1. Ask the source for the neighbours of every seed
//!    (a failing seed is logged and skipped)
//! 2. Keep the best score seen for each candidate across seeds
//! 3. Drop candidates that are seeds themselves
//! 4. Drop candidates whose best score is not positive
//! 5. Sort by score, best first; ties keep the order candidates were first seen

use crate::error::Result;
use crate::types::ScoredMovie;
use data_loader::MovieId;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Anything that can answer "which movies are similar to this one".
pub trait SimilaritySource: Send + Sync {
    fn similar_to(&self, movie_id: MovieId, top_n: usize) -> Result<Vec<ScoredMovie>>;
}

/// Merge per-seed neighbour lists into one ranked list.
pub fn aggregate_similar<S>(
    source: &S,
    seed_ids: &[MovieId],
    top_n_per_seed: usize,
) -> Vec<ScoredMovie>
where
    S: SimilaritySource + ?Sized,
{
    let seeds: HashSet<MovieId> = seed_ids.iter().copied().collect();

    let mut best: Vec<ScoredMovie> = Vec::new();
    // candidate id -> position in `best`
    let mut positions: HashMap<MovieId, usize> = HashMap::new();
    let mut visited: HashSet<MovieId> = HashSet::with_capacity(seeds.len());

    for &seed in seed_ids {
        if !visited.insert(seed) {
            continue;
        }

        let neighbours = match source.similar_to(seed, top_n_per_seed) {
            Ok(neighbours) => neighbours,
            Err(e) => {
                warn!("Similarity lookup failed for seed {}: {}", seed, e);
                continue;
            }
        };
        debug!("Seed {} contributed {} neighbours", seed, neighbours.len());

        for candidate in neighbours {
            if seeds.contains(&candidate.movie_id) {
                continue;
            }
            match positions.get(&candidate.movie_id) {
                Some(&pos) => {
                    if candidate.score > best[pos].score {
                        best[pos].score = candidate.score;
                    }
                }
                None => {
                    positions.insert(candidate.movie_id, best.len());
                    best.push(candidate);
                }
            }
        }
    }

    best.retain(|candidate| candidate.score > 0.0);
    best.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    best
}
