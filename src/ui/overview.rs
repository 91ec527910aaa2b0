use eframe::egui::{
    self, Align2, ColorImage, FontId, Rect, Sense, TextureHandle, TextureOptions, Ui, pos2, vec2,
};

use super::table_view::text_table;
use crate::color::text_color_on;
use crate::data::correlation::CorrelationMatrix;
use crate::data::stats::{STAT_LABELS, format_stat};
use crate::heatmap::{self, cell_color, cell_label};
use crate::overview::NO_NUMERIC_HEATMAP;
use crate::state::AppState;

/// Width reserved for the row labels left of the heatmap grid.
const LABEL_WIDTH: f32 = 150.0;

// ---------------------------------------------------------------------------
// Data overview tab
// ---------------------------------------------------------------------------

pub fn overview_tab(ui: &mut Ui, state: &mut AppState) {
    let AppState {
        overview,
        heatmap_texture,
        status_message,
        ..
    } = state;
    let Some(overview) = overview.as_ref() else {
        return;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Dataset Overview");
            ui.label(overview.shape_text());
            ui.add_space(4.0);

            let head = &overview.head;
            let headers: Vec<String> = head
                .columns
                .iter()
                .zip(&head.dtypes)
                .map(|(name, dtype)| format!("{name}\n{dtype}"))
                .collect();
            let index: Vec<String> = (0..head.rows.len()).map(|i| i.to_string()).collect();
            text_table(ui, "head_table", &headers, &index, &head.rows);

            ui.add_space(8.0);
            ui.label("Summary Statistics:");
            let summary = &overview.summary;
            if summary.is_empty() {
                super::warning(ui, "No numeric columns to summarize.");
            } else {
                let headers: Vec<String> = summary.columns.iter().map(|c| c.column.clone()).collect();
                let labels: Vec<String> = STAT_LABELS.iter().map(|s| s.to_string()).collect();
                let rows: Vec<Vec<String>> = (0..STAT_LABELS.len())
                    .map(|stat| {
                        summary
                            .columns
                            .iter()
                            .map(|c| format_stat(c.values()[stat]))
                            .collect()
                    })
                    .collect();
                text_table(ui, "summary_table", &headers, &labels, &rows);
            }

            ui.add_space(8.0);
            match &overview.correlation {
                Some(matrix) => {
                    ui.heading("Correlation Heatmap");
                    correlation_heatmap(ui, matrix, heatmap_texture);
                    if ui.button("Export PNG…").clicked() {
                        export_dialog(matrix, status_message);
                    }
                }
                None => super::warning(ui, NO_NUMERIC_HEATMAP),
            }
        });
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// Draw the raster texture with value annotations and axis labels on top.
fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix, texture: &mut Option<TextureHandle>) {
    let n = matrix.size();
    if n == 0 {
        return;
    }

    let texture = texture.get_or_insert_with(|| {
        let raster = heatmap::render(matrix, 1);
        let size = [raster.width() as usize, raster.height() as usize];
        let image = ColorImage::from_rgb(size, raster.as_raw());
        ui.ctx()
            .load_texture("correlation_heatmap", image, TextureOptions::NEAREST)
    });

    let cell = ((ui.available_width() - LABEL_WIDTH) / n as f32).clamp(36.0, 90.0);
    let grid_side = cell * n as f32;
    let (rect, _) = ui.allocate_exact_size(vec2(LABEL_WIDTH + grid_side, grid_side + 24.0), Sense::hover());
    let grid = Rect::from_min_size(rect.min + vec2(LABEL_WIDTH, 0.0), vec2(grid_side, grid_side));

    let painter = ui.painter_at(rect);
    painter.image(
        texture.id(),
        grid,
        Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    let value_font = FontId::proportional((cell / 4.0).clamp(10.0, 15.0));
    let label_font = FontId::proportional(12.0);
    let text_color = ui.visuals().text_color();

    for (i, row) in matrix.rows().enumerate() {
        let y = grid.min.y + (i as f32 + 0.5) * cell;
        for (j, value) in row.iter().enumerate() {
            let x = grid.min.x + (j as f32 + 0.5) * cell;
            painter.text(
                pos2(x, y),
                Align2::CENTER_CENTER,
                cell_label(*value),
                value_font.clone(),
                text_color_on(cell_color(*value)),
            );
        }
        painter.text(
            pos2(grid.min.x - 6.0, y),
            Align2::RIGHT_CENTER,
            shorten(&matrix.labels[i], 22),
            label_font.clone(),
            text_color,
        );
    }

    let max_chars = ((cell / 7.0) as usize).max(4);
    for (j, label) in matrix.labels.iter().enumerate() {
        painter.text(
            pos2(grid.min.x + (j as f32 + 0.5) * cell, grid.max.y + 4.0),
            Align2::CENTER_TOP,
            shorten(label, max_chars),
            label_font.clone(),
            text_color,
        );
    }
}

fn shorten(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let kept: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn export_dialog(matrix: &CorrelationMatrix, status_message: &mut Option<String>) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export correlation heatmap")
        .set_file_name("correlation_heatmap.png")
        .add_filter("PNG", &["png"])
        .save_file()
    else {
        return;
    };

    match heatmap::export_png(matrix, &path) {
        Ok(()) => *status_message = Some(format!("Saved {}", path.display())),
        Err(e) => {
            log::error!("Heatmap export failed: {e:#}");
            *status_message = Some(format!("Error: {e:#}"));
        }
    }
}
