//! The fitted index: vectorizer, TF-IDF matrix and row-aligned movie ids.
//!
//! Row `i` of `matrix` belongs to `id_order[i]` and to no other movie. A
//! `FittedIndex` is built in one pass and never mutated afterwards, so a
//! reader holding an `Arc<FittedIndex>` always sees a consistent triple.

use crate::config::EngineConfig;
use crate::text::composite_text;
use crate::types::ScoredMovie;
use crate::vectorizer::{SparseVector, TfidfVectorizer};
use data_loader::{MovieDocument, MovieId};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct FittedIndex {
    vectorizer: TfidfVectorizer,
    matrix: Vec<SparseVector>,
    id_order: Vec<MovieId>,
    /// movie id -> row
    rows: HashMap<MovieId, usize>,
}

impl FittedIndex {
    /// Fit over `movies` in the given order.
    ///
    /// Returns `None` when there is no basis for comparison: fewer than two
    /// distinct movies, or no term surviving the document-frequency cut.
    /// A repeated id keeps its first row.
    pub fn fit(movies: &[MovieDocument], config: &EngineConfig) -> Option<Self> {
        let mut texts = Vec::with_capacity(movies.len());
        let mut id_order = Vec::with_capacity(movies.len());
        let mut rows = HashMap::with_capacity(movies.len());

        for movie in movies {
            if rows.contains_key(&movie.id) {
                warn!("Skipping duplicate movie {} in corpus", movie.id);
                continue;
            }
            rows.insert(movie.id, id_order.len());
            id_order.push(movie.id);
            texts.push(composite_text(movie));
        }

        if texts.len() < 2 {
            debug!("Corpus has {} movies, not fitting", texts.len());
            return None;
        }

        let Some((vectorizer, matrix)) =
            TfidfVectorizer::fit_transform(&texts, config.min_doc_frequency)
        else {
            warn!(
                "No term appears in {} or more of {} movies, index left empty",
                config.min_doc_frequency,
                texts.len()
            );
            return None;
        };

        Some(Self {
            vectorizer,
            matrix,
            id_order,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.id_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_order.is_empty()
    }

    pub fn id_order(&self) -> &[MovieId] {
        &self.id_order
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn row(&self, movie_id: MovieId) -> Option<&SparseVector> {
        self.rows.get(&movie_id).map(|&row| &self.matrix[row])
    }

    /// Top `top_n` neighbours of `movie_id`, best first.
    ///
    /// Ties keep corpus order; the query movie is never returned. Unknown
    /// ids give an empty list.
    pub fn similar_to(&self, movie_id: MovieId, top_n: usize) -> Vec<ScoredMovie> {
        let Some(&query_row) = self.rows.get(&movie_id) else {
            return Vec::new();
        };
        let query = &self.matrix[query_row];

        let scores: Vec<f32> = self.matrix.par_iter().map(|row| query.cosine(row)).collect();

        let mut order: Vec<usize> = (0..scores.len()).collect();
        // stable: equal scores stay in corpus order
        order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

        order
            .into_iter()
            .filter(|&row| row != query_row)
            .take(top_n)
            .map(|row| ScoredMovie::new(self.id_order[row], scores[row]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies() -> Vec<MovieDocument> {
        vec![
            MovieDocument::new(1, "Space War").with_genres(["scifi"]),
            MovieDocument::new(2, "Space Battle").with_genres(["scifi"]),
            MovieDocument::new(3, "Romance in Paris").with_genres(["romance"]),
        ]
    }

    #[test]
    fn test_rows_align_with_ids() {
        let index = FittedIndex::fit(&movies(), &EngineConfig::default()).unwrap();
        assert_eq!(index.id_order(), &[1, 2, 3]);
        assert_eq!(index.len(), 3);
        assert!(index.row(1).is_some());
        assert!(index.row(3).unwrap().is_empty());
        assert!(index.row(99).is_none());
    }

    #[test]
    fn test_too_small_corpus() {
        let config = EngineConfig::default();
        assert!(FittedIndex::fit(&[], &config).is_none());
        assert!(FittedIndex::fit(&movies()[..1], &config).is_none());
    }

    #[test]
    fn test_duplicate_ids_keep_first_row() {
        let mut corpus = movies();
        corpus.push(MovieDocument::new(1, "Space War Again").with_genres(["scifi"]));

        let index = FittedIndex::fit(&corpus, &EngineConfig::default()).unwrap();
        assert_eq!(index.id_order(), &[1, 2, 3]);
    }

    #[test]
    fn test_duplicates_do_not_count_towards_minimum() {
        let corpus = vec![
            MovieDocument::new(1, "Space War"),
            MovieDocument::new(1, "Space War"),
        ];
        assert!(FittedIndex::fit(&corpus, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_similar_to_ranks_shared_vocabulary_first() {
        let index = FittedIndex::fit(&movies(), &EngineConfig::default()).unwrap();
        let results = index.similar_to(1, 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].movie_id, 2);
        assert_eq!(results[1].movie_id, 3);
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let corpus = vec![
            MovieDocument::new(10, "Alpha").with_genres(["drama"]),
            MovieDocument::new(20, "Beta").with_genres(["drama"]),
            MovieDocument::new(30, "Gamma").with_genres(["drama"]),
            MovieDocument::new(40, "Delta").with_genres(["drama"]),
        ];
        let index = FittedIndex::fit(&corpus, &EngineConfig::default()).unwrap();

        let ids: Vec<MovieId> = index.similar_to(30, 10).iter().map(|s| s.movie_id).collect();
        assert_eq!(ids, vec![10, 20, 40]);
    }

    #[test]
    fn test_unknown_id() {
        let index = FittedIndex::fit(&movies(), &EngineConfig::default()).unwrap();
        assert!(index.similar_to(404, 5).is_empty());
    }
}
