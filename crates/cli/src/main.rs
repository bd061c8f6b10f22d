use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{InMemoryStore, MovieDocument, MovieId, MovieStore};
use rand::Rng;
use serde::Serialize;
use server::{MovieRecommendation, RecommendationOrchestrator, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// ReelRecs - Content-based Movie Recommendations
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Movie recommendations from TF-IDF similarity of titles, overviews, genres and keywords", long_about = None)]
struct Cli {
    /// Movie catalog file (JSON array or JSON Lines); defaults to CATALOG_PATH
    #[arg(short, long)]
    data_file: Option<PathBuf>,

    /// Minimum number of movies a term must appear in; defaults to TFIDF_MIN_DF
    #[arg(long)]
    min_df: Option<usize>,

    /// Print results as JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show movies similar to a given movie
    Similar {
        /// Movie ID to find neighbours for
        #[arg(long)]
        movie_id: MovieId,

        /// Number of movies to return
        #[arg(long, default_value_t = similarity::DEFAULT_TOP_N)]
        limit: usize,
    },

    /// Get personalized recommendations from a list of favorite movies
    Recommend {
        /// Favorite movie IDs, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        favorites: Vec<MovieId>,

        /// Number of recommendations to return
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Show the metadata of a single movie
    Show {
        /// Movie ID to display
        #[arg(long)]
        movie_id: MovieId,
    },

    /// Show catalog and index statistics
    Stats,

    /// Run benchmark to test query latency
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    if let Some(path) = cli.data_file {
        settings.catalog_path = path;
    }
    if let Some(min_df) = cli.min_df {
        settings.tfidf_min_df = min_df;
    }
    debug!(?settings, "Resolved settings");

    let start = Instant::now();
    let store = Arc::new(
        InMemoryStore::load_from_file(&settings.catalog_path).with_context(|| {
            format!("Failed to load catalog {}", settings.catalog_path.display())
        })?,
    );
    if !cli.json {
        println!(
            "{} Loaded {} movies from {} in {:?}",
            "✓".green(),
            store.len(),
            settings.catalog_path.display(),
            start.elapsed()
        );
    }

    match cli.command {
        Commands::Similar { movie_id, limit } => {
            handle_similar(store, settings, movie_id, limit, cli.json).await?
        }
        Commands::Recommend { favorites, limit } => {
            handle_recommend(store, settings, favorites, limit, cli.json).await?
        }
        Commands::Search { title } => handle_search(&store, &title, cli.json)?,
        Commands::Show { movie_id } => handle_show(&store, movie_id, cli.json)?,
        Commands::Stats => handle_stats(store, settings, cli.json).await?,
        Commands::Benchmark { requests } => handle_benchmark(store, settings, requests).await?,
    }

    Ok(())
}

/// Handle the 'similar' command
async fn handle_similar(
    store: Arc<InMemoryStore>,
    mut settings: Settings,
    movie_id: MovieId,
    limit: usize,
    json: bool,
) -> Result<()> {
    let movie = store
        .get(movie_id)
        .ok_or_else(|| anyhow!("Movie {} not found", movie_id))?;

    settings.similar_limit = limit;
    let orchestrator = RecommendationOrchestrator::new(store, &settings);
    let recommendations = orchestrator.similar_movies(movie_id).await?;

    if json {
        return print_json(&recommendations);
    }
    println!(
        "{}",
        format!("Movies similar to {}:", movie.display_title())
            .bold()
            .blue()
    );
    print_recommendations(&recommendations);
    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    store: Arc<InMemoryStore>,
    mut settings: Settings,
    favorites: Vec<MovieId>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let unknown: Vec<MovieId> = favorites
        .iter()
        .copied()
        .filter(|id| store.get(*id).is_none())
        .collect();
    if unknown.len() == favorites.len() {
        bail!("None of the favorite movies {:?} are in the catalog", favorites);
    }
    if !unknown.is_empty() && !json {
        println!(
            "{} Ignoring unknown favorites: {:?}",
            "!".yellow(),
            unknown
        );
    }

    settings.recs_limit = limit;
    let orchestrator = RecommendationOrchestrator::new(store, &settings);
    let recommendations = orchestrator.personalized(&favorites).await?;

    if json {
        return print_json(&recommendations);
    }
    println!("{}", "Movie Recommendations:".bold().blue());
    print_recommendations(&recommendations);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(store: &InMemoryStore, title: &str, json: bool) -> Result<()> {
    let matches = store.search_by_title(title);

    if json {
        return print_json(&matches);
    }
    println!(
        "{}",
        format!("Search results for '{}':", title).bold().blue()
    );
    if matches.is_empty() {
        println!("  (no matches)");
    }
    for movie in matches.iter().take(20) {
        println!(
            "{}: {} ({}) [{}]",
            movie.id.to_string().green(),
            movie.display_title(),
            format_year(movie),
            movie.genres.join(", ")
        );
    }
    Ok(())
}

/// Handle the 'show' command
fn handle_show(store: &InMemoryStore, movie_id: MovieId, json: bool) -> Result<()> {
    let movie = store
        .get(movie_id)
        .ok_or_else(|| anyhow!("Movie {} not found", movie_id))?;

    if json {
        return print_json(&movie);
    }
    println!(
        "{}",
        format!("{} ({})", movie.display_title(), format_year(&movie))
            .bold()
            .blue()
    );
    println!("{}ID: {}", "• ".green(), movie.id);
    println!("{}Genres: {}", "• ".green(), movie.genres.join(", "));
    println!("{}Keywords: {}", "• ".green(), movie.keywords.join(", "));
    if let Some(poster) = &movie.poster_path {
        println!("{}Poster: {}", "• ".green(), poster);
    }
    if let Some(overview) = &movie.overview {
        println!();
        println!("{}", overview);
    }
    Ok(())
}

#[derive(Serialize)]
struct CatalogStats {
    movies: usize,
    indexed_movies: usize,
    vocabulary_size: usize,
    min_doc_frequency: usize,
    fit_time_ms: u128,
}

/// Handle the 'stats' command
async fn handle_stats(store: Arc<InMemoryStore>, settings: Settings, json: bool) -> Result<()> {
    let movies = store.len();
    let orchestrator = RecommendationOrchestrator::new(store, &settings);

    let start = Instant::now();
    orchestrator.rebuild().await?;
    let fit_time = start.elapsed();

    let snapshot = orchestrator.engine().snapshot();
    let stats = CatalogStats {
        movies,
        indexed_movies: snapshot.as_ref().map_or(0, |index| index.len()),
        vocabulary_size: snapshot
            .as_ref()
            .map_or(0, |index| index.vectorizer().vocabulary_len()),
        min_doc_frequency: orchestrator.engine().config().min_doc_frequency,
        fit_time_ms: fit_time.as_millis(),
    };

    if json {
        return print_json(&stats);
    }
    println!("{}", "Catalog statistics:".bold().blue());
    println!("{}Movies: {}", "• ".cyan(), stats.movies);
    println!("{}Indexed movies: {}", "• ".cyan(), stats.indexed_movies);
    println!("{}Vocabulary size: {}", "• ".cyan(), stats.vocabulary_size);
    println!(
        "{}Minimum document frequency: {}",
        "• ".cyan(),
        stats.min_doc_frequency
    );
    println!("{}Fit time: {:?}", "• ".cyan(), fit_time);
    if snapshot.is_none() {
        println!(
            "{} Index is empty: the catalog needs at least two movies sharing vocabulary",
            "!".yellow()
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    store: Arc<InMemoryStore>,
    settings: Settings,
    requests: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("Benchmark needs at least one request");
    }
    let movie_ids: Vec<MovieId> = store
        .fetch_all_movies()?
        .into_iter()
        .map(|movie| movie.id)
        .collect();
    if movie_ids.is_empty() {
        bail!("Catalog is empty");
    }

    let orchestrator = RecommendationOrchestrator::new(store, &settings);
    let start = Instant::now();
    orchestrator.rebuild().await?;
    println!("{} Fitted index in {:?}", "✓".green(), start.elapsed());

    let mut rng = rand::rng();
    let targets: Vec<MovieId> = (0..requests)
        .map(|_| movie_ids[rng.random_range(0..movie_ids.len())])
        .collect();

    let wall_clock = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for movie_id in targets {
        let orchestrator = orchestrator.clone();
        handles.push(tokio::spawn(async move {
            let start = Instant::now();
            orchestrator.similar_movies(movie_id).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall_time = wall_clock.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    let percentile = |p: f64| {
        let idx = ((timings.len() as f64 * p) as usize).min(timings.len() - 1);
        timings[idx]
    };

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {}", requests);
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        requests as f64 / wall_time.as_secs_f64()
    );

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_year(movie: &MovieDocument) -> String {
    movie
        .year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "????".to_string())
}

/// Format and print recommendations
fn print_recommendations(recommendations: &[MovieRecommendation]) {
    if recommendations.is_empty() {
        println!("  (no recommendations)");
        return;
    }
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} ({}) [{}] - Score: {:.3}",
            (i + 1).to_string().green(),
            rec.movie.display_title(),
            format_year(&rec.movie),
            rec.movie.genres.join(", "),
            rec.score
        );
        debug!("   source: {:?}", rec.source);
    }
}
