use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::loader::{Notice, Upload};
use crate::error::DataUnavailable;
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – data controls
// ---------------------------------------------------------------------------

/// Render the left data-controls panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data Controls");
    ui.separator();

    ui.label("Upload your dataset (CSV)");
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Browse…").clicked() {
            open_file_dialog(state);
        }
        if ui.button("Reload").clicked() {
            state.reload();
        }
    });
    ui.small("…or drop a file onto the window.");

    if let Some(upload) = &state.upload {
        ui.add_space(4.0);
        ui.label(format!("{} ({} bytes)", upload.name, upload.bytes.len()));
        if ui.small_button("Clear upload").clicked() {
            state.clear_upload();
        }
    }

    ui.add_space(8.0);
    match &state.notice {
        Some(notice @ Notice::Uploaded(_)) => {
            let text = format!("✔ {}", notice.text());
            ui.label(RichText::new(text).color(Color32::from_rgb(46, 160, 67)));
        }
        Some(notice @ Notice::UsingDefault(_)) => {
            let text = format!("ℹ {}", notice.text());
            ui.label(RichText::new(text).color(Color32::from_rgb(56, 139, 253)));
        }
        None => {}
    }

    if let Some(table) = &state.table {
        ui.separator();
        let (rows, cols) = table.shape();
        ui.label(format!("{rows} rows × {cols} columns"));
        ui.label(format!("{} numeric", table.numeric_columns().count()));
    }

    if let Some(msg) = &state.status_message {
        ui.separator();
        ui.label(RichText::new(msg).color(Color32::RED));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the page title and the tab strip.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.heading("Machine Learning Project Visualization Dashboard");
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
    ui.add_space(2.0);
}

pub fn footer(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.small("© 2025 Visualization Framework for ML Projects");
    });
}

/// Page-level failure: nothing else renders in the main area.
pub fn load_error(ui: &mut Ui, err: &DataUnavailable) {
    ui.add_space(16.0);
    super::error(ui, &err.message);
    ui.small(&err.reason);
}

// ---------------------------------------------------------------------------
// File dialog and drag-and-drop
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload your dataset")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

/// Treat a file dropped onto the window as an upload.
pub fn handle_dropped_files(ctx: &egui::Context, state: &mut AppState) {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    let Some(file) = dropped.into_iter().next() else {
        return;
    };

    if let Some(path) = &file.path {
        state.open_path(path);
    } else if let Some(bytes) = &file.bytes {
        state.set_upload(Upload {
            name: file.name.clone(),
            bytes: bytes.to_vec(),
        });
    }
}
