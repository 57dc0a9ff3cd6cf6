use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::GenreColors;
use crate::data::aggregate::{filter_and_aggregate, Aggregates};
use crate::data::cache::DatasetCache;
use crate::data::filter::{FilterCriteria, GenreOption};
use crate::data::model::{MovieTable, RatingRange};

// ---------------------------------------------------------------------------
// Chart style
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    HorizontalBar,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::HorizontalBar, ChartKind::Pie];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::HorizontalBar => "Horizontal Bar Chart",
            ChartKind::Pie => "Pie Chart",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Memoized load + derive of the current dataset file.
    pub cache: DatasetCache,

    /// File the user asked for last (loaded or not).
    pub dataset_path: Option<PathBuf>,

    /// Loaded table (None until a file loads successfully).
    pub table: Option<Arc<MovieTable>>,

    /// Sidebar inputs.
    pub criteria: FilterCriteria,

    /// Results of the last pass over `table` with `criteria`.
    pub aggregates: Aggregates,

    pub genre_colors: Option<GenreColors>,

    pub genre_chart: ChartKind,
    pub title_chart: ChartKind,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(top_n: usize) -> Self {
        let table = MovieTable::default();
        Self {
            cache: DatasetCache::new(),
            dataset_path: None,
            table: None,
            criteria: FilterCriteria::for_table(&table, top_n),
            aggregates: Aggregates::default(),
            genre_colors: None,
            genre_chart: ChartKind::HorizontalBar,
            title_chart: ChartKind::HorizontalBar,
            status_message: None,
        }
    }

    /// Load `path` (through the cache) and reset the filters to its bounds.
    /// A failure leaves the app running without a table.
    pub fn open(&mut self, path: &Path) {
        self.load(path, false);
    }

    /// Drop the cached table and read the current file again, keeping the
    /// user's genre selection and query. The rating range is clamped to the
    /// reloaded table's bounds.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        if let Some(path) = self.dataset_path.clone() {
            self.load(&path, true);
        }
    }

    fn load(&mut self, path: &Path, keep_criteria: bool) {
        self.dataset_path = Some(path.to_path_buf());
        match self.cache.get_or_load(path) {
            Ok(table) => self.set_table(table, keep_criteria),
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.table = None;
                self.genre_colors = None;
                self.aggregates = Aggregates::default();
            }
        }
    }

    fn set_table(&mut self, table: Arc<MovieTable>, keep_criteria: bool) {
        let fresh = FilterCriteria::for_table(&table, self.criteria.top_n);
        if keep_criteria {
            let RatingRange { low, high } = self.criteria.rating;
            let bounds = fresh.rating;
            self.criteria.rating = RatingRange::new(
                low.clamp(bounds.low, bounds.high),
                high.clamp(bounds.low, bounds.high),
            );
        } else {
            self.criteria = fresh;
        }
        self.genre_colors = Some(GenreColors::new(&table.genres));
        self.table = Some(table);
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the aggregates after any criteria change.
    pub fn refresh(&mut self) {
        self.aggregates = match &self.table {
            Some(table) => filter_and_aggregate(table, &self.criteria),
            None => Aggregates::default(),
        };
    }

    /// Add or remove one genre option from the selection.
    pub fn toggle_genre(&mut self, option: &GenreOption) {
        if !self.criteria.genres.remove(option) {
            self.criteria.genres.insert(option.clone());
        }
        self.refresh();
    }

    /// Set the rating range, clamped to the table's bounds with
    /// `low <= high`.
    pub fn set_rating(&mut self, low: f64, high: f64) {
        let (mut low, mut high) = (low.min(high), low.max(high));
        if let Some(bounds) = self.table.as_ref().and_then(|t| t.rating_bounds) {
            low = low.clamp(bounds.low, bounds.high);
            high = high.clamp(bounds.low, bounds.high);
        }
        self.criteria.rating = RatingRange::new(low, high);
        self.refresh();
    }

    pub fn set_query(&mut self, query: &str) {
        self.criteria.query = query.to_string();
        self.refresh();
    }

    pub fn set_top_n(&mut self, n: usize) {
        self.criteria.top_n = n;
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CSV: &str = "title,genres,vote_average,popularity\n\
                       Alien,['Horror'],8.1,60\n\
                       Aliens,\"['Action', 'Horror']\",7.9,55\n\
                       Amelie,['Comedy'],7.9,20\n\
                       Heat,\"['Crime', 'Drama']\",7.9,40\n";

    fn loaded() -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.csv");
        std::fs::write(&path, CSV).unwrap();
        let mut state = AppState::new(2);
        state.open(&path);
        (dir, state)
    }

    #[test]
    fn load_failure_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let mut state = AppState::new(5);
        state.open(&dir.path().join("missing.csv"));
        assert!(state.table.is_none());
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.contains("not found")));
        assert_eq!(state.aggregates, Aggregates::default());
    }

    #[test]
    fn opening_resets_criteria_to_table_bounds() {
        let (_dir, state) = loaded();
        assert_eq!(state.criteria.rating, RatingRange::new(7.9, 8.1));
        assert!(state.criteria.genres.is_empty());
        assert!(state.status_message.is_none());
        // Nothing selected yet: empty histogram, but search and top-N run.
        assert!(state.aggregates.genre_histogram.is_empty());
        assert_eq!(state.aggregates.search_results.len(), 4);
        assert_eq!(state.aggregates.top_n, vec![0, 1]);
    }

    #[test]
    fn widget_changes_recompute_aggregates() {
        let (_dir, mut state) = loaded();
        state.toggle_genre(&GenreOption::Named("Horror".into()));
        assert_eq!(state.aggregates.filtered, vec![0]);

        state.toggle_genre(&GenreOption::All);
        assert_eq!(state.aggregates.filtered.len(), 4);

        state.set_rating(8.0, 9.5);
        assert_eq!(state.criteria.rating, RatingRange::new(8.0, 8.1));
        assert_eq!(state.aggregates.filtered, vec![0]);

        state.toggle_genre(&GenreOption::All);
        state.set_rating(8.1, 7.0);
        assert_eq!(state.criteria.rating, RatingRange::new(7.9, 8.1));
        assert_eq!(state.aggregates.filtered, vec![0]);

        state.set_query("ALIEN");
        assert_eq!(state.aggregates.search_results, vec![0, 1]);

        state.set_top_n(3);
        assert_eq!(state.aggregates.top_n, vec![0, 1, 3]);
    }

    #[test]
    fn reload_keeps_path_and_table() {
        let (_dir, mut state) = loaded();
        let before = state.table.clone().unwrap();
        state.reload();
        let after = state.table.clone().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before, after);
    }

    #[test]
    fn reload_keeps_criteria_and_clamps_rating() {
        let (dir, mut state) = loaded();
        state.toggle_genre(&GenreOption::Named("Horror".into()));
        state.set_query("heat");
        state.set_rating(7.9, 8.1);

        // The reloaded file no longer reaches 8.1.
        std::fs::write(
            dir.path().join("m.csv"),
            "title,genres,vote_average,popularity\n\
             Alien,['Horror'],8.0,60\n\
             Heat,\"['Crime', 'Drama']\",7.9,40\n",
        )
        .unwrap();
        state.reload();

        assert!(state
            .criteria
            .genres
            .contains(&GenreOption::Named("Horror".into())));
        assert_eq!(state.criteria.query, "heat");
        assert_eq!(state.criteria.rating, RatingRange::new(7.9, 8.0));
        assert_eq!(state.aggregates.filtered, vec![0]);
        assert_eq!(state.aggregates.search_results, vec![1]);

        // Opening resets everything.
        state.open(&dir.path().join("m.csv"));
        assert!(state.criteria.genres.is_empty());
        assert!(state.criteria.query.is_empty());
    }
}
