use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::Color32;
use image::{Rgb, RgbImage};

use crate::color;
use crate::data::correlation::CorrelationMatrix;

/// Fill for cells whose correlation is undefined.
pub const UNDEFINED_CELL: Color32 = Color32::from_rgb(245, 245, 245);

// ---------------------------------------------------------------------------
// Correlation heatmap raster
// ---------------------------------------------------------------------------

/// Fill colour for one correlation cell.
pub fn cell_color(value: Option<f64>) -> Color32 {
    value.map_or(UNDEFINED_CELL, color::coolwarm)
}

/// Annotation text for one cell, two decimals.
pub fn cell_label(value: Option<f64>) -> String {
    value.map_or_else(|| "nan".to_string(), |v| format!("{v:.2}"))
}

/// Rasterize the colour grid, `cell_px` pixels per cell. Annotations are
/// drawn by the caller on top of the texture.
pub fn render(matrix: &CorrelationMatrix, cell_px: u32) -> RgbImage {
    let n = matrix.size() as u32;
    let cell_px = cell_px.max(1);
    let side = n * cell_px;

    RgbImage::from_fn(side, side, |x, y| {
        let row = (y / cell_px) as usize;
        let col = (x / cell_px) as usize;
        let [r, g, b, _] = cell_color(matrix.get(row, col)).to_array();
        Rgb([r, g, b])
    })
}

/// Save the raster as a PNG.
pub fn export_png(matrix: &CorrelationMatrix, path: &Path) -> Result<()> {
    render(matrix, 64)
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported correlation heatmap to {}", path.display());
    Ok(())
}
