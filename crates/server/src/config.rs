use serde::Deserialize;
use similarity::EngineConfig;
use std::path::PathBuf;

/// Service configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Minimum document frequency for a term to enter the TF-IDF vocabulary
    #[serde(default = "default_tfidf_min_df")]
    pub tfidf_min_df: usize,

    /// Movie catalog file (JSON array or JSON Lines)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Neighbours returned for a single movie
    #[serde(default = "default_limit")]
    pub similar_limit: usize,

    /// Personalized recommendations returned to a user
    #[serde(default = "default_limit")]
    pub recs_limit: usize,

    /// Neighbours requested per favorite when aggregating
    #[serde(default = "default_limit")]
    pub recs_per_seed: usize,
}

fn default_tfidf_min_df() -> usize {
    2
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/movies.json")
}

fn default_limit() -> usize {
    20
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tfidf_min_df: default_tfidf_min_df(),
            catalog_path: default_catalog_path(),
            similar_limit: default_limit(),
            recs_limit: default_limit(),
            recs_per_seed: default_limit(),
        }
    }
}

impl Settings {
    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Settings>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default().with_min_doc_frequency(self.tfidf_min_df)
    }
}
