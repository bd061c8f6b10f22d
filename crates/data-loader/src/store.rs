//! The movie store seam.
//!
//! [`MovieStore`] is the document-store collaborator that the similarity
//! engine and the service read from. [`InMemoryStore`] is the in-process
//! implementation used by the binaries and the tests.

use crate::error::Result;
use crate::parser;
use crate::types::{MovieDocument, MovieId};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Read/write access to the movie corpus.
///
/// `Send + Sync` so a single store can be shared behind an `Arc` by the
/// engine and the service.
pub trait MovieStore: Send + Sync {
    /// Full corpus read, in stable corpus order
    fn fetch_all_movies(&self) -> Result<Vec<MovieDocument>>;

    /// Documents for the given ids, in corpus order. Unknown ids are skipped.
    fn fetch_movies_by_ids(&self, ids: &[MovieId]) -> Result<Vec<MovieDocument>>;

    /// Up to `limit` documents sharing at least one genre with `genres`,
    /// skipping anything in `exclude`
    fn movies_with_any_genre(
        &self,
        genres: &HashSet<String>,
        exclude: &HashSet<MovieId>,
        limit: usize,
    ) -> Result<Vec<MovieDocument>>;

    /// Insert a document, or replace the one with the same id
    fn upsert_movie(&self, movie: MovieDocument) -> Result<()>;
}

#[derive(Debug, Default)]
struct Inner {
    movies: Vec<MovieDocument>,
    /// movie id -> position in `movies`
    positions: HashMap<MovieId, usize>,
}

/// Insertion-ordered, in-memory movie store.
///
/// Replacing a document keeps its original position, so corpus order is
/// stable across metadata refreshes.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from documents; later duplicates replace earlier ones
    pub fn from_movies(movies: impl IntoIterator<Item = MovieDocument>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for movie in movies {
                upsert_locked(&mut inner, movie);
            }
        }
        store
    }

    /// Load a catalog file (JSON array or JSON Lines)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let movies = parser::parse_catalog(path)?;
        info!("Loaded {} movies from {}", movies.len(), path.display());
        Ok(Self::from_movies(movies))
    }

    pub fn len(&self) -> usize {
        self.inner.read().movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: MovieId) -> Option<MovieDocument> {
        let inner = self.inner.read();
        inner.positions.get(&id).map(|&pos| inner.movies[pos].clone())
    }

    /// Case-insensitive title search: exact matches first, then substring
    /// matches, each group in corpus order
    pub fn search_by_title(&self, query: &str) -> Vec<MovieDocument> {
        let needle = query.to_lowercase();
        let inner = self.inner.read();

        let mut exact = Vec::new();
        let mut partial = Vec::new();
        for movie in &inner.movies {
            let Some(title) = movie.title.as_deref() else {
                continue;
            };
            let title = title.to_lowercase();
            if title == needle {
                exact.push(movie.clone());
            } else if title.contains(&needle) {
                partial.push(movie.clone());
            }
        }

        exact.extend(partial);
        exact
    }
}

fn upsert_locked(inner: &mut Inner, movie: MovieDocument) {
    match inner.positions.get(&movie.id) {
        Some(&pos) => inner.movies[pos] = movie,
        None => {
            inner.positions.insert(movie.id, inner.movies.len());
            inner.movies.push(movie);
        }
    }
}

impl MovieStore for InMemoryStore {
    fn fetch_all_movies(&self) -> Result<Vec<MovieDocument>> {
        Ok(self.inner.read().movies.clone())
    }

    fn fetch_movies_by_ids(&self, ids: &[MovieId]) -> Result<Vec<MovieDocument>> {
        let wanted: HashSet<MovieId> = ids.iter().copied().collect();
        let inner = self.inner.read();
        Ok(inner
            .movies
            .iter()
            .filter(|movie| wanted.contains(&movie.id))
            .cloned()
            .collect())
    }

    fn movies_with_any_genre(
        &self,
        genres: &HashSet<String>,
        exclude: &HashSet<MovieId>,
        limit: usize,
    ) -> Result<Vec<MovieDocument>> {
        let inner = self.inner.read();
        Ok(inner
            .movies
            .iter()
            .filter(|movie| !exclude.contains(&movie.id))
            .filter(|movie| movie.genres.iter().any(|g| genres.contains(g)))
            .take(limit)
            .cloned()
            .collect())
    }

    fn upsert_movie(&self, movie: MovieDocument) -> Result<()> {
        debug!("Upserting movie {}", movie.id);
        upsert_locked(&mut self.inner.write(), movie);
        Ok(())
    }
}
