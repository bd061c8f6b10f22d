//! Test harness for the recommendation orchestrator.
//!
//! Loads the catalog named by `CATALOG_PATH`, fits the similarity index and
//! logs "more like this" and personalized results for the first movies.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use data_loader::{InMemoryStore, MovieStore};
use server::{MovieRecommendation, RecommendationOrchestrator, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,similarity=debug")),
        )
        .init();

    info!("Starting ReelRecs server test harness");

    let settings = Settings::from_env()?;
    info!("Loading catalog from {}...", settings.catalog_path.display());
    let store = Arc::new(
        InMemoryStore::load_from_file(&settings.catalog_path)
            .with_context(|| format!("Failed to load {}", settings.catalog_path.display()))?,
    );
    info!("Catalog loaded: {} movies", store.len());

    let orchestrator = RecommendationOrchestrator::new(store.clone(), &settings);
    orchestrator.rebuild().await?;

    let ids: Vec<_> = store
        .fetch_all_movies()?
        .into_iter()
        .map(|movie| movie.id)
        .take(2)
        .collect();

    let Some(&first) = ids.first() else {
        info!("Catalog is empty, nothing to recommend");
        return Ok(());
    };

    info!("Movies similar to {}:", first);
    log_recommendations(&orchestrator.similar_movies(first).await?);

    info!("Personalized recommendations for favorites {:?}:", ids);
    log_recommendations(&orchestrator.personalized(&ids).await?);

    Ok(())
}

fn log_recommendations(recommendations: &[MovieRecommendation]) {
    for (i, rec) in recommendations.iter().enumerate() {
        info!(
            "{}. {} ({}) - Score: {:.3} [{:?}]",
            i + 1,
            rec.movie.display_title(),
            rec.movie
                .year()
                .map(|y| y.to_string())
                .unwrap_or_else(|| "????".to_string()),
            rec.score,
            rec.source
        );
        info!("   Genres: {}", rec.movie.genres.join(", "));
    }
}
