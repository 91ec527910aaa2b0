//! Chart dispatch: user selections in, plot-ready figures out.
//!
//! Nothing here touches the UI; `ui::plot` draws whatever [`build`] returns.

pub mod histogram;

use std::collections::BTreeMap;

use eframe::egui::Color32;

use crate::color::{self, CategoryColors};
use crate::data::model::{Column, Table};
use crate::data::stats::quantile_sorted;
use crate::script::{self, ScriptLimits, ScriptReport};

use histogram::Histogram;

pub const NOT_ENOUGH_SCATTER: &str = "Not enough numeric columns for scatter plot.";
pub const NO_NUMERIC_DISTRIBUTION: &str = "No numeric columns to plot distribution.";
pub const SELECT_COLUMN: &str = "Select a column to plot.";

/// Colour steps used for a continuous colour column.
const COLOR_STEPS: usize = 12;
pub const DEFAULT_SERIES_COLOR: Color32 = Color32::from_rgb(99, 110, 250);

// ---------------------------------------------------------------------------
// Chart kinds and requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Scatter,
    Bar,
    Distribution,
    Custom,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Scatter,
        ChartKind::Bar,
        ChartKind::Distribution,
        ChartKind::Custom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Bar => "Bar Chart",
            ChartKind::Distribution => "Distribution",
            ChartKind::Custom => "Custom Plot",
        }
    }
}

/// One cycle's chart selection. Each variant carries only its own
/// parameters, so switching kind drops the previous ones.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartRequest {
    Scatter {
        x: Option<String>,
        y: Option<String>,
        color: Option<String>,
    },
    Bar {
        x: Option<String>,
        y: Option<String>,
    },
    Distribution {
        column: Option<String>,
    },
    Custom {
        source: String,
    },
}

impl ChartRequest {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartRequest::Scatter { .. } => ChartKind::Scatter,
            ChartRequest::Bar { .. } => ChartKind::Bar,
            ChartRequest::Distribution { .. } => ChartKind::Distribution,
            ChartRequest::Custom { .. } => ChartKind::Custom,
        }
    }

    /// Initial selection for `kind` over `table`.
    pub fn defaults(kind: ChartKind, table: &Table) -> Self {
        let numeric = table.numeric_column_names();
        match kind {
            ChartKind::Scatter if numeric.len() >= 2 => ChartRequest::Scatter {
                x: numeric.first().cloned(),
                y: numeric.get(1).cloned(),
                color: None,
            },
            ChartKind::Scatter => ChartRequest::Scatter {
                x: None,
                y: None,
                color: None,
            },
            ChartKind::Bar => {
                let first = table.column_names().into_iter().next();
                ChartRequest::Bar {
                    x: first.clone(),
                    y: first,
                }
            }
            ChartKind::Distribution => ChartRequest::Distribution {
                column: numeric.into_iter().next(),
            },
            ChartKind::Custom => ChartRequest::Custom {
                source: script::DEFAULT_SCRIPT.to_string(),
            },
        }
    }
}

/// Column choices offered for a chart kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartOptions {
    pub axis: Vec<String>,
    /// Colour column choices; "none" is implied.
    pub color: Vec<String>,
}

pub fn options(kind: ChartKind, table: &Table) -> ChartOptions {
    match kind {
        ChartKind::Scatter => ChartOptions {
            axis: table.numeric_column_names(),
            color: table.column_names(),
        },
        ChartKind::Bar => ChartOptions {
            axis: table.column_names(),
            color: Vec::new(),
        },
        ChartKind::Distribution => ChartOptions {
            axis: table.numeric_column_names(),
            color: Vec::new(),
        },
        ChartKind::Custom => ChartOptions::default(),
    }
}

// ---------------------------------------------------------------------------
// Figures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    /// Legend name; empty names stay out of the legend.
    pub name: String,
    pub color: Color32,
    pub points: Vec<[f64; 2]>,
}

/// Range legend for a continuous colour column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBar {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarItem {
    pub position: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxItem {
    pub label: String,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxItem {
    /// Quartiles plus whiskers at the furthest values within 1.5 IQR.
    pub fn from_values(label: impl Into<String>, values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let reach = 1.5 * (q3 - q1);
        let (lo_fence, hi_fence) = (q1 - reach, q3 + reach);

        let inside = || sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
        Some(BoxItem {
            label: label.into(),
            lower_whisker: inside().next().unwrap_or(q1),
            q1,
            median,
            q3,
            upper_whisker: inside().last().unwrap_or(q3),
            outliers: sorted
                .iter()
                .copied()
                .filter(|v| *v < lo_fence || *v > hi_fence)
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FigureBody {
    Scatter {
        series: Vec<ScatterSeries>,
        color_bar: Option<ColorBar>,
    },
    Bar {
        bars: Vec<BarItem>,
        width: f64,
        x_categories: Option<Vec<String>>,
        y_categories: Option<Vec<String>>,
    },
    Histogram(Histogram),
    Line {
        points: Vec<[f64; 2]>,
    },
    Box {
        boxes: Vec<BoxItem>,
    },
}

/// A plot-ready figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub body: FigureBody,
}

impl Figure {
    pub fn new(x_label: impl Into<String>, y_label: impl Into<String>, body: FigureBody) -> Self {
        Figure {
            title: None,
            x_label: x_label.into(),
            y_label: y_label.into(),
            body,
        }
    }
}

/// Result of one dispatch.
#[derive(Debug, Clone)]
pub enum ChartOutput {
    Figure(Figure),
    Warning(String),
    Script(ScriptReport),
}

impl ChartOutput {
    fn warning(text: &str) -> Self {
        ChartOutput::Warning(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Turn a request into something drawable. Degenerate selections become
/// warnings; only the custom script can fail, and it reports inline.
pub fn build(table: &Table, request: &ChartRequest, limits: &ScriptLimits) -> ChartOutput {
    match request {
        ChartRequest::Scatter { x, y, color } => {
            scatter(table, x.as_deref(), y.as_deref(), color.as_deref())
        }
        ChartRequest::Bar { x, y } => bar(table, x.as_deref(), y.as_deref()),
        ChartRequest::Distribution { column } => distribution(table, column.as_deref()),
        ChartRequest::Custom { source } => ChartOutput::Script(script::run(source, table, limits)),
    }
}

fn scatter(table: &Table, x: Option<&str>, y: Option<&str>, color: Option<&str>) -> ChartOutput {
    if table.numeric_columns().take(2).count() < 2 {
        return ChartOutput::warning(NOT_ENOUGH_SCATTER);
    }
    let (Some(x), Some(y)) = (x, y) else {
        return ChartOutput::warning(SELECT_COLUMN);
    };
    let (Some(xs), Some(ys)) = (table.numeric_values(x), table.numeric_values(y)) else {
        return ChartOutput::warning(SELECT_COLUMN);
    };

    let rows: Vec<(usize, [f64; 2])> = xs
        .iter()
        .zip(&ys)
        .enumerate()
        .filter_map(|(row, pair)| match pair {
            (Some(a), Some(b)) => Some((row, [*a, *b])),
            _ => None,
        })
        .collect();

    let (series, color_bar) = match color.and_then(|c| table.column(c)) {
        None => (
            vec![ScatterSeries {
                name: String::new(),
                color: DEFAULT_SERIES_COLOR,
                points: rows.into_iter().map(|(_, p)| p).collect(),
            }],
            None,
        ),
        Some(col) if col.is_numeric() => continuous_series(col, rows),
        Some(col) => (category_series(col, rows), None),
    };

    ChartOutput::Figure(Figure::new(x, y, FigureBody::Scatter { series, color_bar }))
}

/// Bucket points into colour steps along the colour column's range.
fn continuous_series(
    col: &Column,
    rows: Vec<(usize, [f64; 2])>,
) -> (Vec<ScatterSeries>, Option<ColorBar>) {
    let shades: Vec<Option<f64>> = rows.iter().map(|(row, _)| col.cell(*row).as_f64()).collect();
    let present = shades.iter().flatten().copied();
    let min = present.clone().fold(f64::INFINITY, f64::min);
    let max = present.fold(f64::NEG_INFINITY, f64::max);

    let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); COLOR_STEPS];
    let mut missing = Vec::new();
    for ((_, point), shade) in rows.into_iter().zip(shades) {
        match shade {
            Some(v) => {
                let t = if max > min { (v - min) / (max - min) } else { 0.5 };
                let idx = ((t * COLOR_STEPS as f64) as usize).min(COLOR_STEPS - 1);
                buckets[idx].push(point);
            }
            None => missing.push(point),
        }
    }

    let mut series: Vec<ScatterSeries> = buckets
        .into_iter()
        .enumerate()
        .filter(|(_, points)| !points.is_empty())
        .map(|(i, points)| ScatterSeries {
            name: String::new(),
            color: color::sequential((i as f64 + 0.5) / COLOR_STEPS as f64),
            points,
        })
        .collect();
    if !missing.is_empty() {
        series.push(ScatterSeries {
            name: "NaN".to_string(),
            color: Color32::GRAY,
            points: missing,
        });
    }

    let color_bar = (min <= max).then(|| ColorBar {
        column: col.name.clone(),
        min,
        max,
    });
    (series, color_bar)
}

/// One series per distinct label of the colour column.
fn category_series(col: &Column, rows: Vec<(usize, [f64; 2])>) -> Vec<ScatterSeries> {
    let mut groups: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
    for (row, point) in rows {
        groups.entry(col.cell(row).to_string()).or_default().push(point);
    }
    let colors = CategoryColors::new(groups.keys().map(String::as_str));
    groups
        .into_iter()
        .map(|(label, points)| ScatterSeries {
            color: colors.color_for(&label),
            name: label,
            points,
        })
        .collect()
}

/// Axis coordinates for any column: numeric values as-is, everything else
/// as category indices in first-appearance order.
struct AxisValues {
    coords: Vec<Option<f64>>,
    categories: Option<Vec<String>>,
}

impl AxisValues {
    fn for_column(col: &Column) -> Self {
        if let Some(coords) = col.numeric_values() {
            return AxisValues {
                coords,
                categories: None,
            };
        }
        let mut categories: Vec<String> = Vec::new();
        let coords = (0..col.data.len())
            .map(|row| {
                let cell = col.cell(row);
                if cell.is_missing() {
                    return None;
                }
                let label = cell.to_string();
                let idx = categories.iter().position(|c| *c == label).unwrap_or_else(|| {
                    categories.push(label);
                    categories.len() - 1
                });
                Some(idx as f64)
            })
            .collect();
        AxisValues {
            coords,
            categories: Some(categories),
        }
    }
}

fn bar(table: &Table, x: Option<&str>, y: Option<&str>) -> ChartOutput {
    let (Some(x_col), Some(y_col)) = (x.and_then(|x| table.column(x)), y.and_then(|y| table.column(y)))
    else {
        return ChartOutput::warning(SELECT_COLUMN);
    };
    let x_axis = AxisValues::for_column(x_col);
    let y_axis = AxisValues::for_column(y_col);

    // Heights at the same position stack.
    let mut stacked: Vec<(f64, f64)> = x_axis
        .coords
        .iter()
        .zip(&y_axis.coords)
        .filter_map(|pair| match pair {
            (Some(px), Some(h)) => Some((*px, *h)),
            _ => None,
        })
        .collect();
    stacked.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut bars: Vec<BarItem> = Vec::new();
    for (position, height) in stacked {
        match bars.last_mut() {
            Some(last) if last.position == position => last.height += height,
            _ => bars.push(BarItem { position, height }),
        }
    }

    let min_gap = bars
        .windows(2)
        .map(|w| w[1].position - w[0].position)
        .fold(f64::INFINITY, f64::min);
    let width = if min_gap.is_finite() { 0.8 * min_gap } else { 0.8 };

    ChartOutput::Figure(Figure::new(
        &x_col.name,
        &y_col.name,
        FigureBody::Bar {
            bars,
            width,
            x_categories: x_axis.categories,
            y_categories: y_axis.categories,
        },
    ))
}

fn distribution(table: &Table, column: Option<&str>) -> ChartOutput {
    if table.numeric_columns().next().is_none() {
        return ChartOutput::warning(NO_NUMERIC_DISTRIBUTION);
    }
    let Some(col) = column.and_then(|c| table.column(c)).filter(|c| c.is_numeric()) else {
        return ChartOutput::warning(SELECT_COLUMN);
    };
    match Histogram::new(&col.present_values()) {
        Some(h) => ChartOutput::Figure(Figure::new(&col.name, "Count", FigureBody::Histogram(h))),
        None => ChartOutput::Warning(format!("Column '{}' has no values to plot.", col.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;

    fn limits() -> ScriptLimits {
        ScriptLimits::default()
    }

    fn people() -> Table {
        parse_csv("Age,Income,Gender\n19,15.5,Male\n21,16.0,Female\n35,,Female\n40,30.25,Male\n".as_bytes())
            .unwrap()
    }

    fn one_numeric() -> Table {
        parse_csv("Score,Gender\n1,Male\n5,Female\n3,Female\n".as_bytes()).unwrap()
    }

    fn figure(output: ChartOutput) -> Figure {
        match output {
            ChartOutput::Figure(f) => f,
            other => panic!("expected a figure, got {other:?}"),
        }
    }

    #[test]
    fn options_follow_column_types() {
        let table = people();
        assert_eq!(options(ChartKind::Scatter, &table).axis, vec!["Age", "Income"]);
        assert_eq!(options(ChartKind::Bar, &table).axis, vec!["Age", "Income", "Gender"]);
        assert_eq!(options(ChartKind::Distribution, &table).axis, vec!["Age", "Income"]);
    }

    #[test]
    fn scatter_defaults_pick_first_two_numeric() {
        let request = ChartRequest::defaults(ChartKind::Scatter, &people());
        assert_eq!(
            request,
            ChartRequest::Scatter {
                x: Some("Age".into()),
                y: Some("Income".into()),
                color: None
            }
        );
    }

    #[test]
    fn single_numeric_column_scatter_warns_distribution_plots() {
        let table = one_numeric();
        let request = ChartRequest::defaults(ChartKind::Scatter, &table);
        assert_eq!(
            request,
            ChartRequest::Scatter {
                x: None,
                y: None,
                color: None
            }
        );
        match build(&table, &request, &limits()) {
            ChartOutput::Warning(w) => assert_eq!(w, NOT_ENOUGH_SCATTER),
            other => panic!("unexpected {other:?}"),
        }

        let request = ChartRequest::defaults(ChartKind::Distribution, &table);
        let fig = figure(build(&table, &request, &limits()));
        match fig.body {
            FigureBody::Histogram(h) => assert_eq!(h.total(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn scatter_skips_rows_with_missing_axes() {
        let table = people();
        let fig = figure(build(&table, &ChartRequest::defaults(ChartKind::Scatter, &table), &limits()));
        match fig.body {
            FigureBody::Scatter { series, color_bar } => {
                assert_eq!(series.len(), 1);
                assert_eq!(series[0].points.len(), 3);
                assert!(color_bar.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn scatter_colored_by_category_splits_series() {
        let table = people();
        let request = ChartRequest::Scatter {
            x: Some("Age".into()),
            y: Some("Income".into()),
            color: Some("Gender".into()),
        };
        match figure(build(&table, &request, &limits())).body {
            FigureBody::Scatter { series, .. } => {
                let names: Vec<_> = series.iter().map(|s| s.name.as_str()).collect();
                assert_eq!(names, vec!["Female", "Male"]);
                assert_eq!(series[1].points.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn scatter_colored_by_number_has_color_bar() {
        let table = people();
        let request = ChartRequest::Scatter {
            x: Some("Age".into()),
            y: Some("Age".into()),
            color: Some("Income".into()),
        };
        match figure(build(&table, &request, &limits())).body {
            FigureBody::Scatter { series, color_bar } => {
                let bar = color_bar.unwrap();
                assert_eq!((bar.min, bar.max), (15.5, 30.25));
                let total: usize = series.iter().map(|s| s.points.len()).sum();
                assert_eq!(total, 4);
                assert!(series.iter().any(|s| s.name == "NaN"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bar_with_categorical_x_stacks_heights() {
        let table = people();
        let request = ChartRequest::Bar {
            x: Some("Gender".into()),
            y: Some("Age".into()),
        };
        match figure(build(&table, &request, &limits())).body {
            FigureBody::Bar { bars, x_categories, width, .. } => {
                assert_eq!(x_categories.unwrap(), vec!["Male", "Female"]);
                assert_eq!(bars, vec![
                    BarItem { position: 0.0, height: 59.0 },
                    BarItem { position: 1.0, height: 56.0 },
                ]);
                assert!((width - 0.8).abs() < 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bar_is_attempted_for_any_pairing() {
        let table = people();
        let request = ChartRequest::Bar {
            x: Some("Age".into()),
            y: Some("Gender".into()),
        };
        match figure(build(&table, &request, &limits())).body {
            FigureBody::Bar { bars, y_categories, .. } => {
                assert_eq!(bars.len(), 4);
                assert!(y_categories.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn text_only_table_distribution_warns() {
        let table = parse_csv("a\nx\ny\n".as_bytes()).unwrap();
        let request = ChartRequest::defaults(ChartKind::Distribution, &table);
        match build(&table, &request, &limits()) {
            ChartOutput::Warning(w) => assert_eq!(w, NO_NUMERIC_DISTRIBUTION),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn distribution_with_far_outlier_stays_small() {
        let table = parse_csv("v\n1\n1\n1\n2\n2\n2\n1e300\n".as_bytes()).unwrap();
        let request = ChartRequest::Distribution {
            column: Some("v".into()),
        };
        match figure(build(&table, &request, &limits())).body {
            FigureBody::Histogram(h) => {
                assert!(h.bins.len() <= 1000);
                assert_eq!(h.total(), 7);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn stale_column_names_warn() {
        let table = people();
        let request = ChartRequest::Distribution {
            column: Some("Gone".into()),
        };
        match build(&table, &request, &limits()) {
            ChartOutput::Warning(w) => assert_eq!(w, SELECT_COLUMN),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn box_item_whiskers_and_outliers() {
        let b = BoxItem::from_values("g", &[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!((b.q1, b.median, b.q3), (2.0, 3.0, 4.0));
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 4.0);
        assert_eq!(b.outliers, vec![100.0]);
        assert!(BoxItem::from_values("empty", &[]).is_none());
    }

    #[test]
    fn custom_request_runs_the_script() {
        let table = people();
        let request = ChartRequest::Custom {
            source: "st.write(df.rows);".into(),
        };
        match build(&table, &request, &limits()) {
            ChartOutput::Script(report) => assert!(report.error.is_none()),
            other => panic!("unexpected {other:?}"),
        }
    }
}
