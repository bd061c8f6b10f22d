//! # Recommendation Orchestrator
//!
//! This module coordinates the recommendation flows on top of the
//! similarity engine:
//! 1. "More like this" for a single movie
//! 2. Personalized recommendations from a user's favorites
//!    - aggregate neighbours of every favorite
//!    - join scores back to movie documents
//!    - fall back to genre overlap when nothing survives
//! 3. Metadata writes, each followed by an index rebuild
//!
//! Engine calls are CPU-bound and synchronous, so they run under
//! `spawn_blocking`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Settings;
use data_loader::{MovieDocument, MovieId, MovieStore};
use similarity::{ScoredMovie, SimilarityEngine};

/// Where a recommendation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// Neighbour of a single movie
    Similar,
    /// Best score across the user's favorites
    Personalized,
    /// Shares a genre with a favorite; carries no similarity score
    GenreFallback,
}

/// A movie document with its score attached
#[derive(Debug, Clone, Serialize)]
pub struct MovieRecommendation {
    #[serde(flatten)]
    pub movie: MovieDocument,
    pub score: f32,
    pub source: RecommendationSource,
}

/// Main orchestrator over the store and the similarity engine
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    store: Arc<dyn MovieStore>,
    engine: Arc<SimilarityEngine>,
    similar_limit: usize,
    recs_limit: usize,
    recs_per_seed: usize,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator; the index is fitted lazily on the first query
    pub fn new(store: Arc<dyn MovieStore>, settings: &Settings) -> Self {
        let engine = Arc::new(SimilarityEngine::with_config(
            store.clone(),
            settings.engine_config(),
        ));
        Self {
            store,
            engine,
            similar_limit: settings.similar_limit,
            recs_limit: settings.recs_limit,
            recs_per_seed: settings.recs_per_seed,
        }
    }

    pub fn engine(&self) -> &Arc<SimilarityEngine> {
        &self.engine
    }

    /// Refit the similarity index from the current corpus
    pub async fn rebuild(&self) -> Result<()> {
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || engine.rebuild())
            .await
            .context("Rebuild task panicked")?
            .context("Failed to rebuild similarity index")
    }

    /// Store new or refreshed metadata and refit so it shows up in recommendations
    pub async fn upsert_movie(&self, movie: MovieDocument) -> Result<()> {
        let movie_id = movie.id;
        self.store
            .upsert_movie(movie)
            .with_context(|| format!("Failed to store movie {}", movie_id))?;
        info!("Stored metadata for movie {}", movie_id);
        self.rebuild().await
    }

    /// Movies most similar to `movie_id`, joined to their documents
    pub async fn similar_movies(&self, movie_id: MovieId) -> Result<Vec<MovieRecommendation>> {
        let start_time = Instant::now();

        let engine = self.engine.clone();
        let limit = self.similar_limit;
        let scored = tokio::task::spawn_blocking(move || engine.similar_to(movie_id, limit))
            .await
            .context("Similarity task panicked")?
            .context("Failed to compute similar movies")?;

        let recommendations = self.join_scores(&scored, RecommendationSource::Similar)?;
        info!(
            "Found {} similar movies for movie {} in {:.2?}",
            recommendations.len(),
            movie_id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Personalized recommendations for a user's favorites.
    ///
    /// Empty favorites give nothing. When the aggregated neighbours yield no
    /// displayable movie, movies sharing a genre with any favorite are
    /// returned instead.
    pub async fn personalized(&self, favorites: &[MovieId]) -> Result<Vec<MovieRecommendation>> {
        if favorites.is_empty() {
            debug!("No favorites, nothing to recommend");
            return Ok(Vec::new());
        }
        let start_time = Instant::now();

        let engine = self.engine.clone();
        let seeds = favorites.to_vec();
        let per_seed = self.recs_per_seed;
        let aggregated =
            tokio::task::spawn_blocking(move || engine.aggregate_similar(&seeds, per_seed))
                .await
                .context("Aggregation task panicked")?;
        info!(
            "Aggregated {} candidates from {} favorites",
            aggregated.len(),
            favorites.len()
        );

        let mut recommendations =
            self.join_scores(&aggregated, RecommendationSource::Personalized)?;
        recommendations.truncate(self.recs_limit);

        if recommendations.is_empty() {
            recommendations = self.genre_fallback(favorites)?;
            info!(
                "Genre fallback produced {} recommendations",
                recommendations.len()
            );
        }

        info!(
            "Selected {} recommendations in {:.2?}",
            recommendations.len(),
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Attach documents to scores, keeping score order and dropping ids
    /// the store no longer has
    fn join_scores(
        &self,
        scored: &[ScoredMovie],
        source: RecommendationSource,
    ) -> Result<Vec<MovieRecommendation>> {
        if scored.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<MovieId> = scored.iter().map(|s| s.movie_id).collect();
        let mut documents: HashMap<MovieId, MovieDocument> = self
            .store
            .fetch_movies_by_ids(&ids)
            .context("Failed to fetch recommended movies")?
            .into_iter()
            .map(|movie| (movie.id, movie))
            .collect();

        let mut missing = Vec::new();
        let recommendations: Vec<MovieRecommendation> = scored
            .iter()
            .filter_map(|s| match documents.remove(&s.movie_id) {
                Some(movie) => Some(MovieRecommendation {
                    movie,
                    score: s.score,
                    source,
                }),
                None => {
                    missing.push(s.movie_id);
                    None
                }
            })
            .collect();

        if !missing.is_empty() {
            warn!("Recommended ids missing from the store: {:?}", missing);
        }
        Ok(recommendations)
    }

    fn genre_fallback(&self, favorites: &[MovieId]) -> Result<Vec<MovieRecommendation>> {
        let favorite_genres: HashSet<String> = self
            .store
            .fetch_movies_by_ids(favorites)
            .context("Failed to fetch favorite movies")?
            .into_iter()
            .flat_map(|movie| movie.genres)
            .collect();

        if favorite_genres.is_empty() {
            return Ok(Vec::new());
        }

        let exclude: HashSet<MovieId> = favorites.iter().copied().collect();
        let movies = self
            .store
            .movies_with_any_genre(&favorite_genres, &exclude, self.recs_limit)
            .context("Failed to search movies by genre")?;

        Ok(movies
            .into_iter()
            .map(|movie| MovieRecommendation {
                movie,
                score: 0.0,
                source: RecommendationSource::GenreFallback,
            })
            .collect())
    }
}
