use eframe::egui::{self, RichText, Ui};

use crate::metrics::{MODEL_METRICS, MetricTile};

// ---------------------------------------------------------------------------
// Model results tab
// ---------------------------------------------------------------------------

pub fn metrics_tab(ui: &mut Ui) {
    ui.heading("Model Summary & Performance");
    ui.add_space(8.0);

    let tiles = MODEL_METRICS.tiles();
    ui.columns(tiles.len(), |columns: &mut [Ui]| {
        for (ui, tile) in columns.iter_mut().zip(&tiles) {
            metric_tile(ui, tile);
        }
    });
}

fn metric_tile(ui: &mut Ui, tile: &MetricTile) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(tile.label);
        ui.label(RichText::new(&tile.value).size(32.0).strong());
    });
}
