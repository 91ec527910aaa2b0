mod app;
mod chart;
mod color;
mod config;
mod data;
mod error;
mod heatmap;
mod metrics;
mod overview;
mod script;
mod state;
mod ui;

use std::path::Path;

use app::DashboardApp;
use config::{CONFIG_FILE, DashboardConfig};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE));
    log::info!("Default dataset: {}", config.default_dataset.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([720.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Machine Learning Project Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(config)))),
    )
}
