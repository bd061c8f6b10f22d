//! Similarity Engine - content-based neighbours over the fitted index
//!
//! Owns the current [`FittedIndex`] and the store it is rebuilt from.
//!
//! ## Concurrency
//! - The current index sits behind a read/write lock as an
//!   `Option<Arc<FittedIndex>>`. Queries clone the `Arc` under a short read
//!   lock and then score against that snapshot without holding any lock.
//! - A rebuild fetches and fits with no index lock held, then publishes
//!   the new index with one write-lock assignment.
//! - Rebuilds are serialised by a separate mutex, so the lazy first-query
//!   rebuild happens once while concurrent queries wait for it.

use crate::aggregate::{self, SimilaritySource};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::index::FittedIndex;
use crate::types::ScoredMovie;
use data_loader::{MovieId, MovieStore};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Content-based similarity over the movies in a [`MovieStore`]
pub struct SimilarityEngine {
    store: Arc<dyn MovieStore>,
    config: EngineConfig,
    current: RwLock<Option<Arc<FittedIndex>>>,
    rebuild_lock: Mutex<()>,
}

impl SimilarityEngine {
    /// Create an engine with no index; the first query fits one
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<dyn MovieStore>, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            current: RwLock::new(None),
            rebuild_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The index queries currently run against, if any
    pub fn snapshot(&self) -> Option<Arc<FittedIndex>> {
        self.current.read().clone()
    }

    pub fn is_fitted(&self) -> bool {
        self.current.read().is_some()
    }

    /// Refit the index from the full corpus.
    ///
    /// A corpus too small to compare leaves the index absent. If the store
    /// read fails the error is returned and the previous index stays.
    #[instrument(skip(self))]
    pub fn rebuild(&self) -> Result<()> {
        let _guard = self.rebuild_lock.lock();
        self.rebuild_locked()
    }

    fn rebuild_locked(&self) -> Result<()> {
        let start = Instant::now();

        let movies = self.store.fetch_all_movies().map_err(|e| {
            warn!("Corpus fetch failed, keeping previous index: {}", e);
            e
        })?;

        let fitted = FittedIndex::fit(&movies, &self.config).map(Arc::new);
        match &fitted {
            Some(index) => info!(
                "Fitted index over {} movies ({} terms) in {:.2?}",
                index.len(),
                index.vectorizer().vocabulary_len(),
                start.elapsed()
            ),
            None => info!(
                "Cleared index, {} movies give no basis for comparison",
                movies.len()
            ),
        }

        *self.current.write() = fitted;
        Ok(())
    }

    /// Current index, fitting it first if absent
    fn ensure_fitted(&self) -> Result<Option<Arc<FittedIndex>>> {
        if let Some(index) = self.snapshot() {
            return Ok(Some(index));
        }

        let _guard = self.rebuild_lock.lock();
        // another query may have fitted while we waited
        if let Some(index) = self.snapshot() {
            return Ok(Some(index));
        }
        debug!("No index yet, fitting before query");
        self.rebuild_locked()?;
        Ok(self.snapshot())
    }

    /// Up to `top_n` movies most similar to `movie_id`, best first.
    ///
    /// Empty when the corpus is too small or the movie is not indexed. The
    /// only error is a failed lazy rebuild.
    #[instrument(skip(self))]
    pub fn similar_to(&self, movie_id: MovieId, top_n: usize) -> Result<Vec<ScoredMovie>> {
        let Some(index) = self.ensure_fitted()? else {
            return Ok(Vec::new());
        };

        let results = index.similar_to(movie_id, top_n);
        debug!("Found {} neighbours for movie {}", results.len(), movie_id);
        Ok(results)
    }

    /// Neighbours of several seeds merged by best score, seeds excluded
    #[instrument(skip(self, seed_ids), fields(seeds = seed_ids.len()))]
    pub fn aggregate_similar(&self, seed_ids: &[MovieId], top_n_per_seed: usize) -> Vec<ScoredMovie> {
        let results = aggregate::aggregate_similar(self, seed_ids, top_n_per_seed);
        debug!("Aggregated {} candidates", results.len());
        results
    }
}

impl SimilaritySource for SimilarityEngine {
    fn similar_to(&self, movie_id: MovieId, top_n: usize) -> Result<Vec<ScoredMovie>> {
        SimilarityEngine::similar_to(self, movie_id, top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{DataLoadError, InMemoryStore, MovieDocument};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn create_test_store() -> Arc<InMemoryStore> {
        Arc::new(InMemoryStore::from_movies(vec![
            MovieDocument::new(1, "Space War").with_genres(["scifi"]),
            MovieDocument::new(2, "Space Battle").with_genres(["scifi"]),
            MovieDocument::new(3, "Romance in Paris").with_genres(["romance"]),
        ]))
    }

    /// Wraps a store, counting reads and failing them on demand
    struct FlakyStore {
        inner: InMemoryStore,
        fail: AtomicBool,
        fetches: AtomicUsize,
    }

    impl FlakyStore {
        fn new(inner: InMemoryStore) -> Self {
            Self {
                inner,
                fail: AtomicBool::new(false),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl MovieStore for FlakyStore {
        fn fetch_all_movies(&self) -> data_loader::Result<Vec<MovieDocument>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(DataLoadError::StoreUnavailable("timeout".to_string()));
            }
            self.inner.fetch_all_movies()
        }

        fn fetch_movies_by_ids(&self, ids: &[MovieId]) -> data_loader::Result<Vec<MovieDocument>> {
            self.inner.fetch_movies_by_ids(ids)
        }

        fn movies_with_any_genre(
            &self,
            genres: &HashSet<String>,
            exclude: &HashSet<MovieId>,
            limit: usize,
        ) -> data_loader::Result<Vec<MovieDocument>> {
            self.inner.movies_with_any_genre(genres, exclude, limit)
        }

        fn upsert_movie(&self, movie: MovieDocument) -> data_loader::Result<()> {
            self.inner.upsert_movie(movie)
        }
    }

    #[test]
    fn test_lazy_fit_on_first_query() {
        let engine = SimilarityEngine::new(create_test_store());
        assert!(!engine.is_fitted());

        let results = engine.similar_to(1, 2).unwrap();
        assert!(engine.is_fitted());
        assert_eq!(results[0].movie_id, 2);
    }

    #[test]
    fn test_lazy_fit_happens_once() {
        let store = Arc::new(FlakyStore::new(InMemoryStore::from_movies(vec![
            MovieDocument::new(1, "Space War").with_genres(["scifi"]),
            MovieDocument::new(2, "Space Battle").with_genres(["scifi"]),
        ])));
        let engine = SimilarityEngine::new(store.clone());

        engine.similar_to(1, 5).unwrap();
        engine.similar_to(2, 5).unwrap();
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_index() {
        let store = Arc::new(FlakyStore::new(InMemoryStore::from_movies(vec![
            MovieDocument::new(1, "Space War").with_genres(["scifi"]),
            MovieDocument::new(2, "Space Battle").with_genres(["scifi"]),
            MovieDocument::new(3, "Romance in Paris").with_genres(["romance"]),
        ])));
        let engine = SimilarityEngine::new(store.clone());
        engine.rebuild().unwrap();
        let before = engine.similar_to(1, 5).unwrap();

        store.fail.store(true, Ordering::SeqCst);
        assert!(engine.rebuild().is_err());
        assert!(engine.is_fitted());
        assert_eq!(engine.similar_to(1, 5).unwrap(), before);
    }

    #[test]
    fn test_lazy_fit_failure_is_an_error() {
        let store = Arc::new(FlakyStore::new(InMemoryStore::new()));
        store.fail.store(true, Ordering::SeqCst);
        let engine = SimilarityEngine::new(store);

        assert!(engine.similar_to(1, 5).is_err());
        assert!(engine.aggregate_similar(&[1, 2], 5).is_empty());
    }

    #[test]
    fn test_rebuild_picks_up_new_movies() {
        let store = create_test_store();
        let engine = SimilarityEngine::new(store.clone());
        engine.rebuild().unwrap();
        assert!(engine.similar_to(4, 5).unwrap().is_empty());

        store
            .upsert_movie(MovieDocument::new(4, "Space Odyssey").with_genres(["scifi"]))
            .unwrap();
        // stale until rebuilt
        assert!(engine.similar_to(4, 5).unwrap().is_empty());

        engine.rebuild().unwrap();
        let results = engine.similar_to(4, 5).unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|s| s.movie_id != 4));
    }

    #[test]
    fn test_single_movie_corpus_stays_absent() {
        let engine = SimilarityEngine::new(Arc::new(InMemoryStore::from_movies(vec![
            MovieDocument::new(1, "Space War"),
        ])));
        engine.rebuild().unwrap();
        assert!(!engine.is_fitted());
        assert!(engine.similar_to(1, 5).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_survives_rebuild() {
        let store = create_test_store();
        let engine = SimilarityEngine::new(store.clone());
        engine.rebuild().unwrap();
        let old = engine.snapshot().unwrap();

        store
            .upsert_movie(MovieDocument::new(4, "Space Odyssey").with_genres(["scifi"]))
            .unwrap();
        engine.rebuild().unwrap();

        assert_eq!(old.len(), 3);
        assert_eq!(engine.snapshot().unwrap().len(), 4);
        assert!(!Arc::ptr_eq(&old, &engine.snapshot().unwrap()));
    }

    #[test]
    fn test_concurrent_queries_and_rebuilds() {
        let store = create_test_store();
        let engine = Arc::new(SimilarityEngine::new(store));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        if i % 4 == 0 {
                            engine.rebuild().unwrap();
                        }
                        let results = engine.similar_to(1, 2).unwrap();
                        assert_eq!(results.len(), 2);
                        assert_eq!(results[0].movie_id, 2);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
