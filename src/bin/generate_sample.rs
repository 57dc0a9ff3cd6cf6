use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Write a synthetic TMDB-style movie dataset.
#[derive(Parser, Debug)]
struct Args {
    /// Output file; `.parquet` writes Parquet, anything else CSV
    #[arg(default_value = "popular_10000_movies_tmdb.csv")]
    output: PathBuf,

    /// Number of movies
    #[arg(long, default_value_t = 10_000)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const GENRES: [&str; 12] = [
    "Action",
    "Adventure",
    "Animation",
    "Comedy",
    "Crime",
    "Drama",
    "Fantasy",
    "Horror",
    "Romance",
    "Science Fiction",
    "Thriller",
    "War",
];
const LANGUAGES: [&str; 6] = ["en", "fr", "ja", "ko", "es", "hi"];
const COMPANIES: [&str; 6] = [
    "Warner Bros. Pictures",
    "Universal Pictures",
    "Toho",
    "Pathé",
    "Studio Ghibli",
    "A24",
];
const WORDS: [&str; 16] = [
    "Night", "Return", "Last", "Star", "Shadow", "City", "Love", "Dead", "Iron", "Dream",
    "Storm", "Secret", "King", "River", "Ghost", "Summer",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

/// One row, in the column order of the TMDB export.
#[derive(Debug, Serialize)]
struct SampleMovie {
    id: i64,
    title: String,
    release_date: String,
    genres: String,
    original_language: String,
    vote_average: f64,
    vote_count: i64,
    popularity: f64,
    budget: f64,
    production_companies: String,
}

/// Python-style list literal, the way the export stores genre lists.
fn list_literal(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{s}'")).collect();
    format!("[{}]", quoted.join(", "))
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Vec<SampleMovie> {
    (0..rows)
        .map(|i| {
            let n_genres = 1 + rng.below(3);
            let genres: Vec<&str> = (0..n_genres).map(|_| rng.pick(&GENRES)).collect();
            let title = format!("{} {}", rng.pick(&WORDS), rng.pick(&WORDS));
            // Heavy tail: a few blockbusters, many obscure titles.
            let popularity = 5.0 + 2000.0 * rng.next_f64().powi(8);
            SampleMovie {
                id: i as i64 + 1,
                title,
                release_date: format!(
                    "{}-{:02}-{:02}",
                    1950 + rng.below(74),
                    1 + rng.below(12),
                    1 + rng.below(28)
                ),
                genres: list_literal(&genres),
                original_language: rng.pick(&LANGUAGES).to_string(),
                vote_average: (rng.next_f64() * 100.0).round() / 10.0,
                vote_count: rng.below(30_000) as i64,
                popularity: (popularity * 1000.0).round() / 1000.0,
                budget: (rng.below(300) as f64) * 1_000_000.0,
                production_companies: list_literal(&[rng.pick(&COMPANIES)]),
            }
        })
        .collect()
}

fn write_csv(path: &Path, movies: &[SampleMovie]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for movie in movies {
        writer.serialize(movie).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn text_column(movies: &[SampleMovie], f: fn(&SampleMovie) -> &str) -> ArrayRef {
    Arc::new(StringArray::from(movies.iter().map(f).collect::<Vec<_>>()))
}

fn float_column(movies: &[SampleMovie], f: fn(&SampleMovie) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from(movies.iter().map(f).collect::<Vec<_>>()))
}

fn int_column(movies: &[SampleMovie], f: fn(&SampleMovie) -> i64) -> ArrayRef {
    Arc::new(Int64Array::from(movies.iter().map(f).collect::<Vec<_>>()))
}

fn write_parquet(path: &Path, movies: &[SampleMovie]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("title", DataType::Utf8, false),
        Field::new("release_date", DataType::Utf8, false),
        Field::new("genres", DataType::Utf8, false),
        Field::new("original_language", DataType::Utf8, false),
        Field::new("vote_average", DataType::Float64, false),
        Field::new("vote_count", DataType::Int64, false),
        Field::new("popularity", DataType::Float64, false),
        Field::new("budget", DataType::Float64, false),
        Field::new("production_companies", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            int_column(movies, |m| m.id),
            text_column(movies, |m| m.title.as_str()),
            text_column(movies, |m| m.release_date.as_str()),
            text_column(movies, |m| m.genres.as_str()),
            text_column(movies, |m| m.original_language.as_str()),
            float_column(movies, |m| m.vote_average),
            int_column(movies, |m| m.vote_count),
            float_column(movies, |m| m.popularity),
            float_column(movies, |m| m.budget),
            text_column(movies, |m| m.production_companies.as_str()),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let movies = generate(args.rows, &mut rng);

    let is_parquet = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"));

    if is_parquet {
        write_parquet(&args.output, &movies)?;
    } else {
        write_csv(&args.output, &movies)?;
    }

    println!("Wrote {} movies to {}", movies.len(), args.output.display());
    Ok(())
}
