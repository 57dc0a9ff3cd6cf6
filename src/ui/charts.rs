use std::f32::consts::TAU;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::generate_palette;
use crate::data::filter::GenreOption;
use crate::data::model::MovieTable;
use crate::state::{AppState, ChartKind};
use crate::ui::panels::genre_label;

const CHART_HEIGHT: f32 = 360.0;
const DODGER_BLUE: Color32 = Color32::from_rgb(30, 144, 255);

// ---------------------------------------------------------------------------
// Genre chart
// ---------------------------------------------------------------------------

/// "Movie Genre Counts": one bar or wedge per genre of the filtered rows.
pub fn genre_chart(ui: &mut Ui, state: &AppState) {
    let histogram = &state.aggregates.genre_histogram;
    if histogram.is_empty() {
        ui.label("No movies match the selected genres and rating.");
        return;
    }

    let entries: Vec<(String, f64, Color32)> = histogram
        .iter()
        .map(|g| {
            let color = state
                .genre_colors
                .as_ref()
                .map(|c| c.color_for(&g.genre))
                .unwrap_or(Color32::GRAY);
            let label = genre_label(&GenreOption::Named(g.genre.clone()));
            (label, g.count as f64, color)
        })
        .collect();

    match state.genre_chart {
        ChartKind::HorizontalBar => {
            ui.strong("Movie Genre Counts");
            let n = entries.len();
            Plot::new("genre_bar_chart")
                .legend(Legend::default())
                .x_axis_label("Count")
                .y_axis_label("Genre")
                .show_axes([true, false])
                .height(CHART_HEIGHT)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    // Most frequent genre on top.
                    for (i, (label, count, color)) in entries.iter().enumerate() {
                        let bar = Bar::new((n - 1 - i) as f64, *count)
                            .name(label)
                            .fill(*color);
                        let chart = BarChart::new(vec![bar])
                            .horizontal()
                            .color(*color)
                            .name(label);
                        plot_ui.bar_chart(chart);
                    }
                });
        }
        ChartKind::Pie => {
            ui.strong("Movie Genre Distribution");
            pie_chart(ui, &entries);
        }
    }
}

// ---------------------------------------------------------------------------
// Title comparison chart
// ---------------------------------------------------------------------------

/// "Movie Title Comparison": popularity of every search hit.
pub fn title_chart(ui: &mut Ui, state: &AppState, table: &MovieTable) {
    let hits = &state.aggregates.search_results;
    if hits.is_empty() {
        ui.label("No matching movie titles found.");
        return;
    }

    let movies: Vec<(String, f64)> = table
        .rows(hits)
        .map(|m| (m.record.title.clone(), m.record.popularity.unwrap_or(0.0)))
        .collect();

    match state.title_chart {
        ChartKind::HorizontalBar => {
            ui.strong("Movie Title Popularity Comparison");
            let n = movies.len();
            let bars: Vec<Bar> = movies
                .iter()
                .enumerate()
                .map(|(i, (title, popularity))| {
                    Bar::new((n - 1 - i) as f64, *popularity)
                        .name(title)
                        .fill(DODGER_BLUE)
                })
                .collect();
            Plot::new("title_bar_chart")
                .x_axis_label("Popularity")
                .y_axis_label("Movie Title")
                .show_axes([true, false])
                .height(CHART_HEIGHT)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    plot_ui.bar_chart(
                        BarChart::new(bars)
                            .horizontal()
                            .color(DODGER_BLUE)
                            .name("Popularity"),
                    );
                });
        }
        ChartKind::Pie => {
            ui.strong("Movie Title Popularity Distribution");
            let palette = generate_palette(movies.len());
            let entries: Vec<(String, f64, Color32)> = movies
                .into_iter()
                .zip(palette)
                .map(|((title, popularity), color)| (title, popularity, color))
                .collect();
            pie_chart(ui, &entries);
        }
    }
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

/// One wedge of a pie, angles in radians clockwise from 3 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub start: f32,
    pub sweep: f32,
    pub fraction: f32,
}

/// Split a full turn proportionally to `values`. Negative values count as
/// zero; an all-zero input yields no slices.
pub fn pie_slices(values: &[f64]) -> Vec<PieSlice> {
    let total: f64 = values.iter().map(|v| v.max(0.0)).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut start = 0.0_f32;
    values
        .iter()
        .map(|v| {
            let fraction = (v.max(0.0) / total) as f32;
            let slice = PieSlice {
                start,
                sweep: fraction * TAU,
                fraction,
            };
            start += slice.sweep;
            slice
        })
        .collect()
}

/// Draw a pie with percentage labels and a legend on the right.
fn pie_chart(ui: &mut Ui, entries: &[(String, f64, Color32)]) {
    let values: Vec<f64> = entries.iter().map(|(_, v, _)| *v).collect();
    let slices = pie_slices(&values);
    if slices.is_empty() {
        ui.label("Nothing to plot.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        let (response, painter) =
            ui.allocate_painter(egui::vec2(CHART_HEIGHT, CHART_HEIGHT), egui::Sense::hover());
        let center = response.rect.center();
        let radius = response.rect.width().min(response.rect.height()) * 0.45;
        let at = |angle: f32, r: f32| Pos2::new(center.x + r * angle.cos(), center.y + r * angle.sin());

        for (slice, (_, _, color)) in slices.iter().zip(entries) {
            if slice.sweep <= 0.0 {
                continue;
            }
            // Fan of thin triangles so wedges wider than half a turn stay convex.
            let steps = ((slice.sweep / 0.05).ceil() as usize).max(1);
            for s in 0..steps {
                let a0 = slice.start + slice.sweep * s as f32 / steps as f32;
                let a1 = slice.start + slice.sweep * (s + 1) as f32 / steps as f32;
                painter.add(Shape::convex_polygon(
                    vec![center, at(a0, radius), at(a1, radius)],
                    *color,
                    Stroke::NONE,
                ));
            }
            if slice.fraction >= 0.02 {
                painter.text(
                    at(slice.start + slice.sweep / 2.0, radius * 0.7),
                    Align2::CENTER_CENTER,
                    format!("{:.1}%", slice.fraction * 100.0),
                    FontId::proportional(12.0),
                    Color32::BLACK,
                );
            }
        }

        ui.vertical(|ui: &mut Ui| {
            for (label, _, color) in entries {
                ui.colored_label(*color, format!("■ {label}"));
            }
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_cover_a_full_turn() {
        let slices = pie_slices(&[2.0, 1.0, 1.0]);
        assert_eq!(slices.len(), 3);
        assert!((slices[0].fraction - 0.5).abs() < 1e-6);
        assert!((slices[1].start - slices[0].sweep).abs() < 1e-6);
        let total: f32 = slices.iter().map(|s| s.sweep).sum();
        assert!((total - TAU).abs() < 1e-4);
    }

    #[test]
    fn degenerate_inputs_give_no_slices() {
        assert!(pie_slices(&[]).is_empty());
        assert!(pie_slices(&[0.0, 0.0]).is_empty());
        let s = pie_slices(&[-3.0, 1.0]);
        assert_eq!(s[0].sweep, 0.0);
        assert!((s[1].fraction - 1.0).abs() < 1e-6);
    }
}
