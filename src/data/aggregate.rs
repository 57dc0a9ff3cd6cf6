use indexmap::IndexMap;

use super::filter::{genre_filtered_indices, rating_filtered_indices, FilterCriteria};
use super::model::MovieTable;

/// One bar of the genre histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// Everything the dashboard draws for one render pass. Row lists are
/// indices into the shared table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregates {
    /// Rows passing the genre and rating filters.
    pub filtered: Vec<usize>,
    /// Counts per primary genre over `filtered`, most frequent first.
    pub genre_histogram: Vec<GenreCount>,
    /// Rows of the full table whose title matches the query.
    pub search_results: Vec<usize>,
    /// Most popular rows of the full table.
    pub top_n: Vec<usize>,
}

/// Run one complete pass over `table`. Pure: the table is never touched.
pub fn filter_and_aggregate(table: &MovieTable, criteria: &FilterCriteria) -> Aggregates {
    let by_genre = genre_filtered_indices(table, &criteria.genres);
    let filtered = rating_filtered_indices(table, &by_genre, criteria.rating);
    let genre_histogram = genre_histogram(table, &filtered);
    let search_results = search_titles(table, &criteria.query);
    let top_n = top_by_popularity(table, criteria.top_n);

    log::debug!(
        "aggregated {} rows: {} filtered, {} genres, {} search hits, top {}",
        table.len(),
        filtered.len(),
        genre_histogram.len(),
        search_results.len(),
        top_n.len()
    );

    Aggregates {
        filtered,
        genre_histogram,
        search_results,
        top_n,
    }
}

/// Count rows per primary genre, sorted by descending count. Genres with
/// equal counts stay in the order they were first met in `indices`.
pub fn genre_histogram(table: &MovieTable, indices: &[usize]) -> Vec<GenreCount> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for movie in table.rows(indices) {
        *counts.entry(movie.primary_genre.as_str()).or_default() += 1;
    }

    let mut histogram: Vec<GenreCount> = counts
        .into_iter()
        .map(|(genre, count)| GenreCount {
            genre: genre.to_string(),
            count,
        })
        .collect();
    // `sort_by` is stable, which is what keeps ties in encounter order.
    histogram.sort_by(|a, b| b.count.cmp(&a.count));
    histogram
}

/// Rows whose title contains `query`, ignoring case. An empty query matches
/// every row.
pub fn search_titles(table: &MovieTable, query: &str) -> Vec<usize> {
    let needle = query.to_lowercase();
    table
        .movies
        .iter()
        .enumerate()
        .filter(|(_, m)| m.title_key.contains(&needle))
        .map(|(i, _)| i)
        .collect()
}

/// The `n` most popular rows, highest first. Equal popularity keeps row
/// order; rows without a popularity value are left out.
pub fn top_by_popularity(table: &MovieTable, n: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = table
        .movies
        .iter()
        .enumerate()
        .filter_map(|(i, m)| m.record.popularity.map(|p| (i, p)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    ranked.into_iter().map(|(i, _)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::derive;
    use crate::data::filter::{GenreOption, GenreSelection, DEFAULT_TOP_N};
    use crate::data::model::{MovieRecord, RatingRange, RawTable};

    fn rec(title: &str, genres: &str, vote: f64, pop: f64) -> MovieRecord {
        MovieRecord {
            title: title.into(),
            genres: Some(genres.into()),
            vote_average: Some(vote),
            popularity: Some(pop),
            ..Default::default()
        }
    }

    fn table(records: Vec<MovieRecord>) -> MovieTable {
        derive(RawTable {
            columns: vec![],
            records,
        })
        .table
    }

    fn two_rows() -> MovieTable {
        table(vec![
            rec("A", "[Action]", 5.0, 10.0),
            rec("B", "Action,Drama", 8.0, 50.0),
        ])
    }

    fn criteria(genres: &[GenreOption], low: f64, high: f64) -> FilterCriteria {
        FilterCriteria {
            genres: genres.iter().cloned().collect::<GenreSelection>(),
            rating: RatingRange::new(low, high),
            query: String::new(),
            top_n: DEFAULT_TOP_N,
        }
    }

    #[test]
    fn action_rows_histogram() {
        let t = two_rows();
        assert!(t.movies.iter().all(|m| m.primary_genre == "Action"));

        let agg = filter_and_aggregate(
            &t,
            &criteria(&[GenreOption::Named("Action".into())], 0.0, 10.0),
        );
        assert_eq!(
            agg.genre_histogram,
            vec![GenreCount {
                genre: "Action".into(),
                count: 2
            }]
        );
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let t = two_rows();
        assert_eq!(search_titles(&t, "a"), vec![0]);
        assert_eq!(search_titles(&t, "B"), vec![1]);
        assert!(search_titles(&t, "z").is_empty());
    }

    #[test]
    fn empty_query_matches_every_row() {
        let t = two_rows();
        assert_eq!(search_titles(&t, ""), vec![0, 1]);
    }

    #[test]
    fn top_one_is_most_popular() {
        let t = two_rows();
        let top = top_by_popularity(&t, 1);
        assert_eq!(top, vec![1]);
        assert_eq!(t.movies[1].record.title, "B");
        assert_eq!(t.movies[1].record.popularity, Some(50.0));
    }

    #[test]
    fn top_n_is_sorted_and_bounded() {
        let t = table(vec![
            rec("a", "x", 1.0, 3.0),
            rec("b", "x", 1.0, 9.0),
            rec("c", "x", 1.0, 1.0),
            rec("d", "x", 1.0, 9.0),
            rec("e", "x", 1.0, 7.0),
        ]);
        let top = top_by_popularity(&t, 3);
        assert_eq!(top, vec![1, 3, 4]);

        let min_in = top
            .iter()
            .map(|&i| t.movies[i].record.popularity.unwrap())
            .fold(f64::INFINITY, f64::min);
        for (i, m) in t.movies.iter().enumerate() {
            if !top.contains(&i) {
                assert!(m.record.popularity.unwrap() <= min_in);
            }
        }

        assert_eq!(top_by_popularity(&t, 10).len(), 5);
        assert!(top_by_popularity(&t, 0).is_empty());
    }

    #[test]
    fn top_n_skips_rows_without_popularity() {
        let mut missing = rec("m", "x", 1.0, 0.0);
        missing.popularity = None;
        let t = table(vec![missing, rec("p", "x", 1.0, 2.0)]);
        assert_eq!(top_by_popularity(&t, 5), vec![1]);
    }

    #[test]
    fn histogram_ties_keep_encounter_order() {
        let t = table(vec![
            rec("1", "Drama", 5.0, 1.0),
            rec("2", "Comedy", 5.0, 1.0),
            rec("3", "Horror", 5.0, 1.0),
            rec("4", "Comedy", 5.0, 1.0),
            rec("5", "Horror", 5.0, 1.0),
        ]);
        let all: Vec<usize> = (0..t.len()).collect();
        let h = genre_histogram(&t, &all);
        let order: Vec<(&str, usize)> = h.iter().map(|g| (g.genre.as_str(), g.count)).collect();
        assert_eq!(order, vec![("Comedy", 2), ("Horror", 2), ("Drama", 1)]);
    }

    #[test]
    fn histogram_counts_sum_to_filtered_size() {
        let t = table(vec![
            rec("1", "Drama", 4.0, 1.0),
            rec("2", "Comedy", 6.0, 1.0),
            rec("3", "[Drama]", 7.0, 1.0),
            rec("4", "Comedy", 9.5, 1.0),
            rec("5", "Horror", 6.0, 1.0),
        ]);
        let agg = filter_and_aggregate(&t, &criteria(&[GenreOption::All], 5.0, 9.0));
        let total: usize = agg.genre_histogram.iter().map(|g| g.count).sum();
        assert_eq!(total, agg.filtered.len());
        assert_eq!(agg.filtered, vec![1, 2, 4]);
    }

    #[test]
    fn search_and_top_n_ignore_genre_and_rating_filters() {
        let t = two_rows();
        let mut c = criteria(&[], 0.0, 10.0);
        c.query = "b".into();
        let agg = filter_and_aggregate(&t, &c);
        assert!(agg.filtered.is_empty());
        assert!(agg.genre_histogram.is_empty());
        assert_eq!(agg.search_results, vec![1]);
        assert_eq!(agg.top_n, vec![1, 0]);
    }
}
