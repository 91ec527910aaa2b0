use std::cell::RefCell;
use std::rc::Rc;

use rhai::{Array, Dynamic, Engine, EvalAltResult, INT, Map, Scope};

use crate::chart::histogram::Histogram;
use crate::chart::{BarItem, BoxItem, DEFAULT_SERIES_COLOR, Figure, FigureBody, ScatterSeries};
use crate::data::model::{CellValue, Table};
use crate::data::stats::ColumnSummary;
use crate::error::ExecutionError;

/// Pre-filled text of the custom plot editor.
pub const DEFAULT_SCRIPT: &str = r#"// `df` is the loaded table, `plt` builds a figure, `st` shows output.
plt.boxplot(df, "Gender", "Spending Score (1-100)");
plt.title("Spending score by gender");
st.plot();
"#;

type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Something a script asked to show.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputItem {
    Text(String),
    Warning(String),
    Error(String),
    Figure(Figure),
}

/// Everything one run produced. Items emitted before a failure are kept.
#[derive(Debug, Clone, Default)]
pub struct ScriptReport {
    pub items: Vec<OutputItem>,
    pub error: Option<ExecutionError>,
}

/// Bounds on one run. Size limits make oversized values a script error
/// instead of an allocation failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptLimits {
    pub max_operations: u64,
    /// Bytes per string.
    pub max_string_size: usize,
    /// Elements per array.
    pub max_array_size: usize,
    /// Entries per object map.
    pub max_map_size: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        ScriptLimits {
            max_operations: 5_000_000,
            max_string_size: 16 * 1024 * 1024,
            max_array_size: 1_000_000,
            max_map_size: 100_000,
        }
    }
}

// ---------------------------------------------------------------------------
// Script-side handles
// ---------------------------------------------------------------------------

/// Figure under construction by `plt` calls.
#[derive(Default)]
struct Draft {
    title: Option<String>,
    x_label: Option<String>,
    y_label: Option<String>,
    /// Body plus its default axis labels.
    body: Option<(FigureBody, String, String)>,
}

#[derive(Default)]
struct Sink {
    items: Vec<OutputItem>,
    draft: Draft,
}

type SharedSink = Rc<RefCell<Sink>>;

/// `df`
#[derive(Clone)]
struct TableHandle(Rc<Table>);

/// `st`
#[derive(Clone)]
struct Page(SharedSink);

/// `plt`
#[derive(Clone)]
struct Canvas(SharedSink);

impl Page {
    fn push(&mut self, item: OutputItem) {
        self.0.borrow_mut().items.push(item);
    }

    /// Move the drafted figure into the output.
    fn plot(&mut self) -> ScriptResult<()> {
        let mut sink = self.0.borrow_mut();
        let draft = std::mem::take(&mut sink.draft);
        let Some((body, x_default, y_default)) = draft.body else {
            return Err("no figure to show; draw something with plt first".into());
        };
        sink.items.push(OutputItem::Figure(Figure {
            title: draft.title,
            x_label: draft.x_label.unwrap_or(x_default),
            y_label: draft.y_label.unwrap_or(y_default),
            body,
        }));
        Ok(())
    }
}

impl Canvas {
    fn draw(&mut self, body: FigureBody, x_label: &str, y_label: &str) {
        self.0.borrow_mut().draft.body = Some((body, x_label.to_string(), y_label.to_string()));
    }

    fn with_draft(&mut self, f: impl FnOnce(&mut Draft)) {
        f(&mut self.0.borrow_mut().draft);
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn cell_to_dynamic(cell: CellValue<'_>) -> Dynamic {
    match cell {
        CellValue::Integer(i) => Dynamic::from_int(i as INT),
        CellValue::Float(f) => Dynamic::from_float(f),
        CellValue::Bool(b) => Dynamic::from_bool(b),
        CellValue::Text(s) => Dynamic::from(s.to_string()),
        CellValue::Missing => Dynamic::UNIT,
    }
}

fn to_f64(value: &Dynamic) -> Option<f64> {
    value
        .as_float()
        .ok()
        .or_else(|| value.as_int().ok().map(|i| i as f64))
}

/// Numbers from a script array; `()` entries are skipped.
fn numbers(values: &Array, what: &str) -> ScriptResult<Vec<Option<f64>>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if v.is_unit() {
                return Ok(None);
            }
            to_f64(v)
                .map(Some)
                .ok_or_else(|| format!("{what}[{i}] is not a number ({})", v.type_name()).into())
        })
        .collect()
}

fn paired_points(xs: &Array, ys: &Array) -> ScriptResult<Vec<[f64; 2]>> {
    if xs.len() != ys.len() {
        return Err(format!("x has {} values but y has {}", xs.len(), ys.len()).into());
    }
    let xs = numbers(xs, "x")?;
    let ys = numbers(ys, "y")?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .filter_map(|pair| match pair {
            (Some(x), Some(y)) => Some([x, y]),
            _ => None,
        })
        .collect())
}

fn unknown_column(name: &str) -> Box<EvalAltResult> {
    format!("unknown column '{name}'").into()
}

fn summary_map(summary: &ColumnSummary) -> Map {
    let opt = |v: Option<f64>| v.map_or(Dynamic::UNIT, Dynamic::from_float);
    let mut map = Map::new();
    map.insert("count".into(), Dynamic::from_int(summary.count as INT));
    map.insert("mean".into(), opt(summary.mean));
    map.insert("std".into(), opt(summary.std));
    map.insert("min".into(), opt(summary.min));
    map.insert("25%".into(), opt(summary.q1));
    map.insert("50%".into(), opt(summary.median));
    map.insert("75%".into(), opt(summary.q3));
    map.insert("max".into(), opt(summary.max));
    map
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

fn register_table(engine: &mut Engine) {
    engine
        .register_type_with_name::<TableHandle>("DataFrame")
        .register_get("shape", |t: &mut TableHandle| -> Array {
            let (rows, cols) = t.0.shape();
            vec![Dynamic::from_int(rows as INT), Dynamic::from_int(cols as INT)]
        })
        .register_get("rows", |t: &mut TableHandle| t.0.row_count() as INT)
        .register_get("columns", |t: &mut TableHandle| -> Array {
            t.0.column_names().into_iter().map(Dynamic::from).collect()
        })
        .register_get("numeric_columns", |t: &mut TableHandle| -> Array {
            t.0.numeric_column_names().into_iter().map(Dynamic::from).collect()
        })
        .register_fn("column", |t: &mut TableHandle, name: &str| -> ScriptResult<Array> {
            let col = t.0.column(name).ok_or_else(|| unknown_column(name))?;
            Ok((0..t.0.row_count()).map(|row| cell_to_dynamic(col.cell(row))).collect())
        })
        .register_fn("row", |t: &mut TableHandle, index: INT| -> ScriptResult<Map> {
            let rows = t.0.row_count();
            let row = usize::try_from(index)
                .ok()
                .filter(|r| *r < rows)
                .ok_or_else(|| format!("row index {index} out of range for {rows} rows"))?;
            let map: Map = t
                .0
                .columns()
                .iter()
                .map(|c| (c.name.as_str().into(), cell_to_dynamic(c.cell(row))))
                .collect();
            Ok(map)
        })
        .register_fn("describe", |t: &mut TableHandle, name: &str| -> ScriptResult<Map> {
            let col = t.0.column(name).ok_or_else(|| unknown_column(name))?;
            if !col.is_numeric() {
                return Err(format!("column '{name}' is not numeric").into());
            }
            Ok(summary_map(&ColumnSummary::from_values(name, &col.present_values())))
        });
}

fn register_page(engine: &mut Engine) {
    engine
        .register_type_with_name::<Page>("Page")
        .register_fn("write", |p: &mut Page, value: Dynamic| {
            p.push(OutputItem::Text(value.to_string()))
        })
        .register_fn("text", |p: &mut Page, value: Dynamic| {
            p.push(OutputItem::Text(value.to_string()))
        })
        .register_fn("warning", |p: &mut Page, value: Dynamic| {
            p.push(OutputItem::Warning(value.to_string()))
        })
        .register_fn("error", |p: &mut Page, value: Dynamic| {
            p.push(OutputItem::Error(value.to_string()))
        })
        .register_fn("plot", Page::plot);
}

fn register_canvas(engine: &mut Engine) {
    engine
        .register_type_with_name::<Canvas>("Canvas")
        .register_fn("scatter", |c: &mut Canvas, xs: Array, ys: Array| -> ScriptResult<()> {
            let points = paired_points(&xs, &ys)?;
            let series = vec![ScatterSeries {
                name: String::new(),
                color: DEFAULT_SERIES_COLOR,
                points,
            }];
            c.draw(FigureBody::Scatter { series, color_bar: None }, "x", "y");
            Ok(())
        })
        .register_fn("line", |c: &mut Canvas, xs: Array, ys: Array| -> ScriptResult<()> {
            let points = paired_points(&xs, &ys)?;
            c.draw(FigureBody::Line { points }, "x", "y");
            Ok(())
        })
        .register_fn("bar", |c: &mut Canvas, labels: Array, heights: Array| -> ScriptResult<()> {
            if labels.len() != heights.len() {
                return Err(format!(
                    "{} labels but {} heights",
                    labels.len(),
                    heights.len()
                )
                .into());
            }
            let bars = numbers(&heights, "heights")?
                .into_iter()
                .enumerate()
                .filter_map(|(i, h)| h.map(|height| BarItem { position: i as f64, height }))
                .collect();
            let categories = labels.iter().map(|l| l.to_string()).collect();
            c.draw(
                FigureBody::Bar {
                    bars,
                    width: 0.8,
                    x_categories: Some(categories),
                    y_categories: None,
                },
                "",
                "",
            );
            Ok(())
        })
        .register_fn("hist", |c: &mut Canvas, values: Array| -> ScriptResult<()> {
            let values: Vec<f64> = numbers(&values, "values")?.into_iter().flatten().collect();
            let hist = Histogram::new(&values).ok_or("hist needs at least one number")?;
            c.draw(FigureBody::Histogram(hist), "", "Count");
            Ok(())
        })
        .register_fn(
            "boxplot",
            |c: &mut Canvas, df: TableHandle, x: &str, y: &str| -> ScriptResult<()> {
                let table = &df.0;
                let x_col = table.column(x).ok_or_else(|| unknown_column(x))?;
                let y_col = table.column(y).ok_or_else(|| unknown_column(y))?;
                if !y_col.is_numeric() {
                    return Err(format!("column '{y}' is not numeric").into());
                }

                // Groups in first-appearance order.
                let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
                for row in 0..table.row_count() {
                    let (label, value) = (x_col.cell(row), y_col.cell(row).as_f64());
                    let (false, Some(value)) = (label.is_missing(), value) else {
                        continue;
                    };
                    let label = label.to_string();
                    match groups.iter_mut().find(|(l, _)| *l == label) {
                        Some((_, values)) => values.push(value),
                        None => groups.push((label, vec![value])),
                    }
                }
                let boxes = groups
                    .iter()
                    .filter_map(|(label, values)| BoxItem::from_values(label.as_str(), values))
                    .collect();
                c.draw(FigureBody::Box { boxes }, x, y);
                Ok(())
            },
        )
        .register_fn("title", |c: &mut Canvas, text: &str| {
            c.with_draft(|d| d.title = Some(text.to_string()))
        })
        .register_fn("xlabel", |c: &mut Canvas, text: &str| {
            c.with_draft(|d| d.x_label = Some(text.to_string()))
        })
        .register_fn("ylabel", |c: &mut Canvas, text: &str| {
            c.with_draft(|d| d.y_label = Some(text.to_string()))
        });
}

/// A fresh engine per run. It exposes no file, network or process access;
/// `print` goes to the page.
fn build_engine(sink: &SharedSink, limits: &ScriptLimits) -> Engine {
    let mut engine = Engine::new();
    engine.set_max_operations(limits.max_operations);
    engine.set_max_string_size(limits.max_string_size);
    engine.set_max_array_size(limits.max_array_size);
    engine.set_max_map_size(limits.max_map_size);
    engine.set_max_modules(0);

    let printer = Rc::clone(sink);
    engine.on_print(move |s| printer.borrow_mut().items.push(OutputItem::Text(s.to_string())));

    register_table(&mut engine);
    register_page(&mut engine);
    register_canvas(&mut engine);
    engine
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Run `source` against `table`. Failures are captured in the report and
/// never propagate.
pub fn run(source: &str, table: &Table, limits: &ScriptLimits) -> ScriptReport {
    let sink: SharedSink = Rc::default();
    let engine = build_engine(&sink, limits);

    let mut scope = Scope::new();
    scope.push("df", TableHandle(Rc::new(table.clone())));
    scope.push("st", Page(Rc::clone(&sink)));
    scope.push("plt", Canvas(Rc::clone(&sink)));

    let result = engine.run_with_scope(&mut scope, source);
    let error = result.err().map(|e| {
        log::warn!("Custom script failed: {e}");
        ExecutionError::new(e.to_string())
    });

    let items = std::mem::take(&mut sink.borrow_mut().items);
    log::debug!("Custom script produced {} output item(s)", items.len());
    ScriptReport { items, error }
}
