//! Engine configuration.

/// Neighbours returned by a single-movie query when the caller has no preference
pub const DEFAULT_TOP_N: usize = 12;

/// Settings for fitting the TF-IDF index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Minimum number of documents a term must appear in to enter the vocabulary
    pub min_doc_frequency: usize,
}

impl EngineConfig {
    /// Configure the minimum document frequency (default: 2, never below 1)
    pub fn with_min_doc_frequency(mut self, min_df: usize) -> Self {
        self.min_doc_frequency = min_df.max(1);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_doc_frequency: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_doc_frequency_is_clamped() {
        assert_eq!(EngineConfig::default().min_doc_frequency, 2);
        assert_eq!(
            EngineConfig::default()
                .with_min_doc_frequency(0)
                .min_doc_frequency,
            1
        );
        assert_eq!(
            EngineConfig::default()
                .with_min_doc_frequency(5)
                .min_doc_frequency,
            5
        );
    }
}
