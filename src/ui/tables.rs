use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::MovieTable;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Every column of every row, in file order.
pub fn raw_dataset(ui: &mut Ui, table: &MovieTable) {
    ui.push_id("raw_dataset", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(60.0).clip(true), table.columns.len())
            .max_scroll_height(300.0)
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for col in &table.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(col);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.len(), |mut row| {
                    let movie = &table.movies[row.index()];
                    for col in &table.columns {
                        row.col(|ui: &mut Ui| {
                            ui.label(movie.record.display_cell(col));
                        });
                    }
                });
            });
    });
}

/// Title and popularity of the ranking rows.
pub fn top_movies(ui: &mut Ui, state: &AppState, table: &MovieTable) {
    ui.push_id("top_movies", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(280.0))
            .column(Column::remainder())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("title");
                });
                header.col(|ui: &mut Ui| {
                    ui.strong("popularity");
                });
            })
            .body(|mut body| {
                for movie in table.rows(&state.aggregates.top_n) {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(&movie.record.title);
                        });
                        row.col(|ui: &mut Ui| {
                            let popularity = movie
                                .record
                                .popularity
                                .map(|p| format!("{p:.3}"))
                                .unwrap_or_default();
                            ui.label(popularity);
                        });
                    });
                }
            });
    });
}
