use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{genre_options, GenreOption};
use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Cheap Arc clone so the table can be read while `state` is mutated.
    let Some(table) = state.table.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Genre multiselect ----
            let options = genre_options(&table);
            let header_text = format!(
                "Select Genre  ({}/{})",
                state.criteria.genres.len(),
                options.len()
            );
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("genre_filter")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if ui.small_button("Clear").clicked() {
                        state.criteria.genres.clear();
                        state.refresh();
                    }
                    for option in &options {
                        let mut checked = state.criteria.genres.contains(option);
                        let mut text = RichText::new(genre_label(option));
                        if let (GenreOption::Named(g), Some(colors)) = (option, &state.genre_colors) {
                            text = text.color(colors.color_for(g));
                        }
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_genre(option);
                        }
                    }
                });
            ui.separator();

            // ---- Rating range ----
            ui.strong("Select Rating");
            if let Some(bounds) = table.rating_bounds {
                let mut low = state.criteria.rating.low;
                let mut high = state.criteria.rating.high;
                let low_changed = ui
                    .add(egui::Slider::new(&mut low, bounds.low..=bounds.high).text("min"))
                    .changed();
                let high_changed = ui
                    .add(egui::Slider::new(&mut high, bounds.low..=bounds.high).text("max"))
                    .changed();
                if low_changed || high_changed {
                    state.set_rating(low, high);
                }
            } else {
                ui.label("No ratings in this dataset.");
            }
            ui.separator();

            // ---- Genre chart style ----
            ui.strong("Select Genre Chart Type");
            chart_kind_radio(ui, &mut state.genre_chart);
            ui.separator();

            // ---- Title search ----
            ui.strong("Search Movie Titles");
            let mut query = state.criteria.query.clone();
            if ui.text_edit_singleline(&mut query).changed() {
                state.set_query(&query);
            }
            ui.separator();

            ui.strong("Select Title Chart Type");
            chart_kind_radio(ui, &mut state.title_chart);
            ui.separator();

            // ---- Ranking size ----
            ui.horizontal(|ui: &mut Ui| {
                ui.strong("Top movies");
                let mut n = state.criteria.top_n;
                if ui
                    .add(egui::DragValue::new(&mut n).range(1..=50))
                    .changed()
                {
                    state.set_top_n(n);
                }
            });
        });
}

fn chart_kind_radio(ui: &mut Ui, kind: &mut ChartKind) {
    for option in ChartKind::ALL {
        ui.radio_value(kind, option, option.label());
    }
}

/// Display text for a picker entry; the empty fallback genre gets a name.
pub fn genre_label(option: &GenreOption) -> String {
    match option {
        GenreOption::Named(g) if g.is_empty() => "(no genre)".to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dataset_path.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(table), Some(path)) = (&state.table, state.cache.cached_path()) {
            ui.label(format!(
                "{}: {} movies loaded, {} match the filters",
                path.display(),
                table.len(),
                state.aggregates.filtered.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open movie dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_labels() {
        assert_eq!(genre_label(&GenreOption::All), "All Genres");
        assert_eq!(genre_label(&GenreOption::Named("Drama".into())), "Drama");
        assert_eq!(genre_label(&GenreOption::Named(String::new())), "(no genre)");
    }
}
