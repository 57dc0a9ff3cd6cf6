use std::collections::BTreeSet;
use std::fmt;

use super::model::{MovieTable, RatingRange};

/// Label of the "every genre" entry in the genre picker.
pub const ALL_GENRES_LABEL: &str = "All Genres";

/// Number of rows in the popularity ranking unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 5;

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// One entry of the genre picker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GenreOption {
    /// Matches every row and overrides any named genre next to it.
    All,
    Named(String),
}

impl fmt::Display for GenreOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenreOption::All => write!(f, "{ALL_GENRES_LABEL}"),
            GenreOption::Named(g) => write!(f, "{g}"),
        }
    }
}

/// Selected genre options. Empty means nothing is selected → no rows.
pub type GenreSelection = BTreeSet<GenreOption>;

/// Every input that shapes one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub genres: GenreSelection,
    pub rating: RatingRange,
    /// Case-insensitive title substring. Applies to the full table.
    pub query: String,
    pub top_n: usize,
}

impl FilterCriteria {
    /// Criteria for a freshly loaded table: no genre picked, rating range
    /// spanning the table's bounds, empty query.
    pub fn for_table(table: &MovieTable, top_n: usize) -> Self {
        Self {
            genres: GenreSelection::new(),
            rating: table
                .rating_bounds
                .unwrap_or_else(|| RatingRange::new(0.0, 10.0)),
            query: String::new(),
            top_n,
        }
    }
}

/// Picker entries: "All Genres" followed by the table's genres in order of
/// first appearance.
pub fn genre_options(table: &MovieTable) -> Vec<GenreOption> {
    std::iter::once(GenreOption::All)
        .chain(table.genres.iter().cloned().map(GenreOption::Named))
        .collect()
}

/// Indices of rows whose primary genre is selected.
pub fn genre_filtered_indices(table: &MovieTable, selection: &GenreSelection) -> Vec<usize> {
    if selection.contains(&GenreOption::All) {
        return (0..table.len()).collect();
    }
    let names: BTreeSet<&str> = selection
        .iter()
        .filter_map(|opt| match opt {
            GenreOption::Named(g) => Some(g.as_str()),
            GenreOption::All => None,
        })
        .collect();
    table
        .movies
        .iter()
        .enumerate()
        .filter(|(_, m)| names.contains(m.primary_genre.as_str()))
        .map(|(i, _)| i)
        .collect()
}

/// Narrow `indices` to rows rated within `range` (inclusive). Unrated rows
/// never pass.
pub fn rating_filtered_indices(table: &MovieTable, indices: &[usize], range: RatingRange) -> Vec<usize> {
    indices
        .iter()
        .copied()
        .filter(|&i| {
            table
                .movies
                .get(i)
                .and_then(|m| m.record.vote_average)
                .is_some_and(|v| range.contains(v))
        })
        .collect()
}
