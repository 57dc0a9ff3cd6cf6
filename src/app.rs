use eframe::egui::{self, Ui};

use crate::state::AppState;
use crate::ui::{charts, panels, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MovieDashApp {
    pub state: AppState,
}

impl MovieDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for MovieDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dataset, charts, ranking ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &self.state);
        });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a movie dataset to begin  (File → Open…)");
        });
        return;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Top 10,000 Popular Movies");

            egui::CollapsingHeader::new("Raw Dataset")
                .id_salt("raw_dataset_header")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    tables::raw_dataset(ui, table);
                });
            ui.add_space(8.0);

            ui.heading("Data Visualization");
            charts::genre_chart(ui, state);
            ui.add_space(8.0);

            ui.heading("Movie Title Comparison");
            charts::title_chart(ui, state, table);
            ui.add_space(8.0);

            ui.heading(format!("Top {} Movies", state.criteria.top_n));
            tables::top_movies(ui, state, table);
        });
}
