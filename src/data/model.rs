use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a source column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl CellValue {
    /// Interpret the cell as a number. NaN counts as missing.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            _ => return None,
        };
        (!v.is_nan()).then_some(v)
    }

    /// The cell as text, `None` for null.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// MovieRecord – one row of the source file
// ---------------------------------------------------------------------------

pub const COL_TITLE: &str = "title";
pub const COL_GENRES: &str = "genres";
pub const COL_VOTE_AVERAGE: &str = "vote_average";
pub const COL_POPULARITY: &str = "popularity";
pub const COL_ORIGINAL_LANGUAGE: &str = "original_language";
pub const COL_RELEASE_DATE: &str = "release_date";
pub const COL_BUDGET: &str = "budget";
pub const COL_PRODUCTION_COMPANIES: &str = "production_companies";

/// Columns a file must carry to be loaded at all.
pub const REQUIRED_COLUMNS: [&str; 4] = [COL_TITLE, COL_GENRES, COL_VOTE_AVERAGE, COL_POPULARITY];

/// A single movie as read from disk, before any derivation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MovieRecord {
    pub title: String,
    /// Raw genre list, e.g. `"['Action', 'Drama']"`. `None` when the cell
    /// was missing or not a string.
    pub genres: Option<String>,
    pub vote_average: Option<f64>,
    pub popularity: Option<f64>,
    pub original_language: Option<String>,
    pub release_date: Option<String>,
    pub budget: Option<f64>,
    pub production_companies: Option<String>,
    /// Every other column, verbatim.
    pub extra: BTreeMap<String, CellValue>,
}

impl MovieRecord {
    /// Render any column of this record for display, known or extra.
    pub fn display_cell(&self, column: &str) -> String {
        fn opt_num(v: Option<f64>) -> String {
            v.map(|v| v.to_string()).unwrap_or_default()
        }
        match column {
            COL_TITLE => self.title.clone(),
            COL_GENRES => self.genres.clone().unwrap_or_default(),
            COL_VOTE_AVERAGE => opt_num(self.vote_average),
            COL_POPULARITY => opt_num(self.popularity),
            COL_ORIGINAL_LANGUAGE => self.original_language.clone().unwrap_or_default(),
            COL_RELEASE_DATE => self.release_date.clone().unwrap_or_default(),
            COL_BUDGET => opt_num(self.budget),
            COL_PRODUCTION_COMPANIES => self.production_companies.clone().unwrap_or_default(),
            other => self.extra.get(other).map(|v| v.to_string()).unwrap_or_default(),
        }
    }
}

/// The loader's output: records in file order plus the header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    /// Column names in header order.
    pub columns: Vec<String>,
    pub records: Vec<MovieRecord>,
}

// ---------------------------------------------------------------------------
// Movie / MovieTable – derived, read-only view
// ---------------------------------------------------------------------------

/// A record with its derived fields attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub record: MovieRecord,
    /// First listed genre with `'`, `[` and `]` removed.
    pub primary_genre: String,
    /// Lowercased title used for case-insensitive search.
    pub title_key: String,
}

/// Inclusive closed interval over `vote_average`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingRange {
    pub low: f64,
    pub high: f64,
}

impl RatingRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, v: f64) -> bool {
        self.low <= v && v <= self.high
    }
}

/// The full derived dataset, shared read-only between render passes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MovieTable {
    pub columns: Vec<String>,
    pub movies: Vec<Movie>,
    /// Unique primary genres in order of first appearance.
    pub genres: Vec<String>,
    /// Min/max `vote_average` over the whole table; `None` when no row has one.
    pub rating_bounds: Option<RatingRange>,
}

impl MovieTable {
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Iterate the movies behind a list of row indices.
    pub fn rows<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = &'a Movie> + 'a {
        indices.iter().filter_map(|&i| self.movies.get(i))
    }

    /// Clone the underlying records, e.g. to derive them again.
    #[cfg(test)]
    pub fn records(&self) -> Vec<MovieRecord> {
        self.movies.iter().map(|m| m.record.clone()).collect()
    }
}
