pub mod metrics;
pub mod overview;
pub mod panels;
pub mod plot;
pub mod table_view;

use eframe::egui::{RichText, Ui};

/// Soft condition: the widget is skipped, the rest of the page renders.
pub fn warning(ui: &mut Ui, text: &str) {
    let color = ui.visuals().warn_fg_color;
    ui.label(RichText::new(format!("⚠ {text}")).color(color));
}

pub fn error(ui: &mut Ui, text: &str) {
    let color = ui.visuals().error_fg_color;
    ui.label(RichText::new(text).color(color).strong());
}
