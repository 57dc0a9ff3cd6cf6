use std::fmt;

use indexmap::IndexSet;

use super::model::{Movie, MovieRecord, MovieTable, RatingRange, RawTable};

/// Primary genre assigned when a record has no usable genre list.
pub const FALLBACK_GENRE: &str = "";

/// Characters scrubbed from genre tokens (leftovers of a stringified list).
const STRAY_GENRE_CHARS: [char; 3] = ['\'', '[', ']'];

// ---------------------------------------------------------------------------
// Derivation warnings
// ---------------------------------------------------------------------------

/// A record whose derived fields fell back to a default. Recovered locally;
/// never aborts the pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivationWarning {
    pub row: usize,
    pub title: String,
    pub reason: WarningReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningReason {
    /// The `genres` cell was missing, null or not a string.
    MissingGenres,
}

impl fmt::Display for DerivationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            WarningReason::MissingGenres => write!(
                f,
                "row {} ({:?}): no genre list, primary genre set to {:?}",
                self.row, self.title, FALLBACK_GENRE
            ),
        }
    }
}

/// Output of [`derive`]: the table plus any per-row fallbacks taken.
#[derive(Debug, Clone)]
pub struct Derived {
    pub table: MovieTable,
    pub warnings: Vec<DerivationWarning>,
}

// ---------------------------------------------------------------------------
// Field derivation
// ---------------------------------------------------------------------------

/// First comma-separated token of `genres` with every `'`, `[` and `]`
/// removed. `"['Action', 'Drama']"` → `"Action"`.
///
/// Surrounding whitespace is kept, as the token is used verbatim as a
/// grouping key.
pub fn primary_genre(genres: &str) -> String {
    genres
        .split(',')
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| !STRAY_GENRE_CHARS.contains(c))
        .collect()
}

pub fn title_key(title: &str) -> String {
    title.to_lowercase()
}

/// Attach `primary_genre` and `title_key` to every record and compute the
/// table-wide genre list and rating bounds.
pub fn derive(raw: RawTable) -> Derived {
    let RawTable { columns, records } = raw;
    let mut warnings = Vec::new();

    let movies: Vec<Movie> = records
        .into_iter()
        .enumerate()
        .map(|(row, record)| derive_movie(row, record, &mut warnings))
        .collect();

    let genres: IndexSet<&str> = movies.iter().map(|m| m.primary_genre.as_str()).collect();
    let genres = genres.into_iter().map(str::to_string).collect();

    let rating_bounds = movies
        .iter()
        .filter_map(|m| m.record.vote_average)
        .fold(None, |acc: Option<RatingRange>, v| match acc {
            None => Some(RatingRange::new(v, v)),
            Some(r) => Some(RatingRange::new(r.low.min(v), r.high.max(v))),
        });

    Derived {
        table: MovieTable {
            columns,
            movies,
            genres,
            rating_bounds,
        },
        warnings,
    }
}

fn derive_movie(row: usize, record: MovieRecord, warnings: &mut Vec<DerivationWarning>) -> Movie {
    let primary_genre = match record.genres.as_deref() {
        Some(genres) => primary_genre(genres),
        None => {
            warnings.push(DerivationWarning {
                row,
                title: record.title.clone(),
                reason: WarningReason::MissingGenres,
            });
            FALLBACK_GENRE.to_string()
        }
    };
    let title_key = title_key(&record.title);

    Movie {
        record,
        primary_genre,
        title_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, genres: Option<&str>, vote: f64, pop: f64) -> MovieRecord {
        MovieRecord {
            title: title.into(),
            genres: genres.map(str::to_string),
            vote_average: Some(vote),
            popularity: Some(pop),
            ..Default::default()
        }
    }

    fn raw(records: Vec<MovieRecord>) -> RawTable {
        RawTable {
            columns: vec!["title".into(), "genres".into()],
            records,
        }
    }

    #[test]
    fn primary_genre_takes_first_token_and_strips_brackets() {
        assert_eq!(primary_genre("[Action]"), "Action");
        assert_eq!(primary_genre("Action,Drama"), "Action");
        assert_eq!(primary_genre("['Science Fiction', 'Drama']"), "Science Fiction");
        assert_eq!(primary_genre("[]"), "");
        assert_eq!(primary_genre(""), "");
        assert_eq!(primary_genre("Ac'ti[on]"), "Action");
    }

    #[test]
    fn derived_fields_follow_their_sources() {
        let derived = derive(raw(vec![
            record("The Matrix", Some("['Action', 'Science Fiction']"), 8.2, 70.0),
            record("AMÉLIE", Some("[Comedy]"), 7.9, 20.0),
        ]));
        for m in &derived.table.movies {
            assert_eq!(m.title_key, m.record.title.to_lowercase());
            assert!(!m.primary_genre.contains(['\'', '[', ']']));
        }
        assert_eq!(derived.table.movies[1].title_key, "amélie");
        assert!(derived.warnings.is_empty());
    }

    #[test]
    fn derive_is_idempotent() {
        let first = derive(raw(vec![
            record("A", Some("[Action]"), 5.0, 10.0),
            record("B", None, 8.0, 50.0),
        ]))
        .table;
        let again = derive(RawTable {
            columns: first.columns.clone(),
            records: first.records(),
        })
        .table;
        assert_eq!(first, again);
    }

    #[test]
    fn missing_genres_fall_back_with_a_warning() {
        let derived = derive(raw(vec![
            record("A", Some("[Action]"), 5.0, 10.0),
            record("B", None, 8.0, 50.0),
            record("C", Some(""), 6.0, 1.0),
        ]));
        assert_eq!(derived.table.movies[1].primary_genre, FALLBACK_GENRE);
        assert_eq!(derived.table.movies[2].primary_genre, "");
        assert_eq!(derived.warnings.len(), 1);
        assert_eq!(derived.warnings[0].row, 1);
        assert_eq!(derived.warnings[0].reason, WarningReason::MissingGenres);
    }

    #[test]
    fn genre_list_keeps_first_encounter_order() {
        let derived = derive(raw(vec![
            record("A", Some("Drama"), 5.0, 1.0),
            record("B", Some("[Action]"), 5.0, 1.0),
            record("C", Some("Drama,Action"), 5.0, 1.0),
        ]));
        assert_eq!(derived.table.genres, vec!["Drama", "Action"]);
    }

    #[test]
    fn rating_bounds_skip_missing_votes() {
        let mut unrated = record("C", Some("Drama"), 0.0, 1.0);
        unrated.vote_average = None;
        let derived = derive(raw(vec![
            record("A", Some("Drama"), 6.5, 1.0),
            unrated,
            record("B", Some("Drama"), 3.0, 1.0),
        ]));
        assert_eq!(derived.table.rating_bounds, Some(RatingRange::new(3.0, 6.5)));

        let empty = derive(raw(Vec::new()));
        assert_eq!(empty.table.rating_bounds, None);
        assert!(empty.table.genres.is_empty());
    }
}
