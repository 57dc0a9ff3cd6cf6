mod app;
mod cli;
mod color;
mod data;
mod state;
mod ui;

use app::MovieDashApp;
use clap::Parser;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();
    let cli = cli::Cli::parse();

    // A missing or broken default file only shows an error in the top bar.
    let mut state = AppState::new(cli.top_n);
    state.open(&cli.dataset);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Top 10,000 Popular Movies",
        options,
        Box::new(move |_cc| Ok(Box::new(MovieDashApp::new(state)))),
    )
}
