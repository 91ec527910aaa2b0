use super::model::Table;

// ---------------------------------------------------------------------------
// Descriptive statistics over numeric columns
// ---------------------------------------------------------------------------

/// Row labels of the summary table, in display order.
pub const STAT_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Statistics for one numeric column. `None` where the value is undefined
/// (no values, or fewer than two for the standard deviation).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    pub fn from_values(column: &str, values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        ColumnSummary {
            column: column.to_string(),
            count: sorted.len(),
            mean: mean(&sorted),
            std: sample_std(&sorted),
            min: sorted.first().copied(),
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q3: quantile_sorted(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }

    /// Values in [`STAT_LABELS`] order.
    pub fn values(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            self.mean,
            self.std,
            self.min,
            self.q1,
            self.median,
            self.q3,
            self.max,
        ]
    }
}

/// One [`ColumnSummary`] per numeric column, in table order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryStatistics {
    pub columns: Vec<ColumnSummary>,
}

impl SummaryStatistics {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Summaries for every numeric column; empty when there are none.
pub fn describe(table: &Table) -> SummaryStatistics {
    SummaryStatistics {
        columns: table
            .numeric_columns()
            .map(|col| ColumnSummary::from_values(&col.name, &col.present_values()))
            .collect(),
    }
}

/// Display form used in the summary grid.
pub fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.6}"),
        Some(v) if v == f64::INFINITY => "inf".to_string(),
        Some(v) if v == f64::NEG_INFINITY => "-inf".to_string(),
        _ => "NaN".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with one degree of freedom removed.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Linear-interpolated quantile at position `q·(n−1)` of a sorted slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
