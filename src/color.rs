use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lab, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgb(channel(rgb.red), channel(rgb.green), channel(rgb.blue))
}

fn lab(r: u8, g: u8, b: u8) -> Lab {
    Srgb::new(r, g, b).into_format::<f32>().into_color()
}

/// Sample a piecewise gradient through `stops` (evenly spaced) at `t ∈ [0, 1]`,
/// mixing in Lab space.
fn sample_gradient(stops: &[(u8, u8, u8)], t: f32) -> Color32 {
    let Some(&(r, g, b)) = stops.first() else {
        return Color32::GRAY;
    };
    if stops.len() == 1 || !t.is_finite() {
        return Color32::from_rgb(r, g, b);
    }
    let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
    let idx = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - idx as f32;

    if frac <= 0.0 {
        let (r, g, b) = stops[idx];
        return Color32::from_rgb(r, g, b);
    }
    if frac >= 1.0 {
        let (r, g, b) = stops[idx + 1];
        return Color32::from_rgb(r, g, b);
    }

    let (r0, g0, b0) = stops[idx];
    let (r1, g1, b1) = stops[idx + 1];
    let mixed = lab(r0, g0, b0).mix(lab(r1, g1, b1), frac);
    to_color32(mixed.into_color())
}

// ---------------------------------------------------------------------------
// Continuous colour maps
// ---------------------------------------------------------------------------

const COOLWARM: [(u8, u8, u8); 3] = [(59, 76, 192), (221, 221, 221), (180, 4, 38)];

const PLASMA: [(u8, u8, u8); 5] = [
    (13, 8, 135),
    (126, 3, 168),
    (204, 71, 120),
    (248, 149, 64),
    (240, 249, 33),
];

/// Diverging blue–white–red map for correlations in [-1, 1].
pub fn coolwarm(value: f64) -> Color32 {
    sample_gradient(&COOLWARM, ((value + 1.0) / 2.0) as f32)
}

/// Sequential map for a continuous colour column, `t ∈ [0, 1]`.
pub fn sequential(t: f64) -> Color32 {
    sample_gradient(&PLASMA, t as f32)
}

/// Black or white, whichever reads better on `background`.
pub fn text_color_on(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luminance = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luminance > 150.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct labels of a categorical column to distinct colours.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl CategoryColors {
    /// Assign palette colours to the labels in sorted order.
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let unique: BTreeSet<&str> = labels.into_iter().collect();
        let palette = generate_palette(unique.len());
        let mapping = unique
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.to_string(), c))
            .collect();

        CategoryColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn coolwarm_endpoints() {
        assert_eq!(coolwarm(-1.0), Color32::from_rgb(59, 76, 192));
        assert_eq!(coolwarm(1.0), Color32::from_rgb(180, 4, 38));
        // Out-of-range values clamp instead of wrapping.
        assert_eq!(coolwarm(5.0), coolwarm(1.0));
    }

    #[test]
    fn midpoint_is_light() {
        assert_eq!(text_color_on(coolwarm(0.0)), Color32::BLACK);
        assert_eq!(text_color_on(coolwarm(-1.0)), Color32::WHITE);
    }

    #[test]
    fn categories_get_stable_colours() {
        let colors = CategoryColors::new(["Male", "Female", "Male"]);
        let palette = generate_palette(2);
        assert_eq!(colors.color_for("Female"), palette[0]);
        assert_eq!(colors.color_for("Male"), palette[1]);
        assert_eq!(colors.color_for("Other"), Color32::GRAY);
    }
}
