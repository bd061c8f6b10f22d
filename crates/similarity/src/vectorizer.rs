//! TF-IDF vectorizer over unigrams and bigrams.
//!
//! ## Weighting
//! - vocabulary: terms whose document frequency is at least `min_df`,
//!   indexed in lexicographic order so repeated fits are identical
//! - idf(t) = ln((1 + n) / (1 + df(t))) + 1
//! - row weight = raw count × idf, then the row is scaled to unit length
//!
//! All weights are non-negative, so cosine similarity between two rows is
//! their dot product and lies in [0, 1].

use crate::text::analyze;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A sparse row: `(column, weight)` pairs sorted by column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Merge-join dot product over the sorted columns
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (ci, wi) = self.entries[i];
            let (cj, wj) = other.entries[j];
            if ci == cj {
                sum += wi * wj;
                i += 1;
                j += 1;
            } else if ci < cj {
                i += 1;
            } else {
                j += 1;
            }
        }
        sum
    }

    /// Cosine similarity; 0.0 when either side has no weight
    pub fn cosine(&self, other: &SparseVector) -> f32 {
        let denom = self.norm() * other.norm();
        if denom <= f32::EPSILON {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0)
    }
}

/// Fitted vocabulary and IDF weights
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Fit on `texts` and transform them in one pass.
    ///
    /// Returns `None` when no term reaches `min_df` documents.
    pub fn fit_transform(texts: &[String], min_df: usize) -> Option<(Self, Vec<SparseVector>)> {
        let analyzed: Vec<Vec<String>> = texts.par_iter().map(|t| analyze(t)).collect();

        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for terms in &analyzed {
            let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let n = texts.len() as f32;
        let mut vocabulary = HashMap::new();
        let mut idf = Vec::new();
        // BTreeMap iteration is lexicographic
        for (term, df) in doc_freq {
            if df >= min_df {
                vocabulary.insert(term.to_string(), idf.len());
                idf.push(((1.0 + n) / (1.0 + df as f32)).ln() + 1.0);
            }
        }

        if vocabulary.is_empty() {
            return None;
        }

        let vectorizer = Self { vocabulary, idf };
        let matrix = analyzed
            .par_iter()
            .map(|terms| vectorizer.weigh(terms))
            .collect();
        Some((vectorizer, matrix))
    }

    /// TF-IDF row for an arbitrary text under the fitted vocabulary
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&analyze(text))
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary.get(term).map(|&col| self.idf[col])
    }

    fn weigh(&self, terms: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
        for term in terms {
            if let Some(&col) = self.vocabulary.get(term) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(col, count)| (col, count * self.idf[col]))
            .collect();

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in entries.iter_mut() {
                *w /= norm;
            }
        }
        SparseVector { entries }
    }
}
