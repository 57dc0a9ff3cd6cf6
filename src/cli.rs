use std::path::PathBuf;

use clap::Parser;

use crate::data::filter::DEFAULT_TOP_N;

/// File name of the TMDB export the dashboard opens by default.
pub const DEFAULT_DATASET: &str = "popular_10000_movies_tmdb.csv";

#[derive(Parser, Debug, Clone)]
#[command(name = "movie-dash", version, about = "Top 10,000 popular movies dashboard")]
pub struct Cli {
    /// Dataset to open at startup (.csv, .json or .parquet)
    #[arg(default_value = DEFAULT_DATASET)]
    pub dataset: PathBuf,

    /// Number of movies in the popularity ranking
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,
}
