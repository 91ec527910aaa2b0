use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell, borrowed out of a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the column variants.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue<'a> {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(&'a str),
    Missing,
}

impl fmt::Display for CellValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{}", format_float(*v)),
            CellValue::Bool(true) => write!(f, "True"),
            CellValue::Bool(false) => write!(f, "False"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Missing => write!(f, "NaN"),
        }
    }
}

impl CellValue<'_> {
    /// Try to interpret the value as an `f64` for plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

/// Shortest round-trip form, but always with a decimal point for finite
/// whole numbers (`3.0` rather than `3`) so floats read as floats.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// Column – one named, typed column
// ---------------------------------------------------------------------------

/// Column storage. The variant is fixed when the table is loaded, so chart
/// eligibility checks never inspect cell types at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Every cell present and integral.
    Integer(Vec<i64>),
    /// Every present cell numeric; `None` marks a missing cell.
    Float(Vec<Option<f64>>),
    /// Every cell a boolean literal.
    Bool(Vec<bool>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Integer(_) | ColumnData::Float(_))
    }

    /// Short dtype label shown in the UI.
    pub fn dtype(&self) -> &'static str {
        match self {
            ColumnData::Integer(_) => "int64",
            ColumnData::Float(_) => "float64",
            ColumnData::Bool(_) => "bool",
            ColumnData::Text(_) => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Column {
            name: name.into(),
            data,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.data.is_numeric()
    }

    /// Cell at `row`, or `Missing` past the end.
    pub fn cell(&self, row: usize) -> CellValue<'_> {
        match &self.data {
            ColumnData::Integer(v) => v.get(row).map_or(CellValue::Missing, |&i| CellValue::Integer(i)),
            ColumnData::Float(v) => match v.get(row) {
                Some(Some(f)) => CellValue::Float(*f),
                _ => CellValue::Missing,
            },
            ColumnData::Bool(v) => v.get(row).map_or(CellValue::Missing, |&b| CellValue::Bool(b)),
            ColumnData::Text(v) => match v.get(row) {
                Some(Some(s)) => CellValue::Text(s),
                _ => CellValue::Missing,
            },
        }
    }

    /// Numeric view of the column, `None` for non-numeric columns.
    pub fn numeric_values(&self) -> Option<Vec<Option<f64>>> {
        match &self.data {
            ColumnData::Integer(v) => Some(v.iter().map(|&i| Some(i as f64)).collect()),
            ColumnData::Float(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Present numeric values only (missing cells dropped).
    pub fn present_values(&self) -> Vec<f64> {
        self.numeric_values()
            .map(|vals| vals.into_iter().flatten().filter(|v| !v.is_nan()).collect())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Ordered named columns with a shared row count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table; every column must hold `row_count` cells.
    pub fn new(columns: Vec<Column>, row_count: usize) -> anyhow::Result<Self> {
        if let Some(bad) = columns.iter().find(|c| c.data.len() != row_count) {
            anyhow::bail!(
                "column '{}' has {} rows, expected {row_count}",
                bad.name,
                bad.data.len()
            );
        }
        Ok(Table { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count, self.column_count())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    pub fn numeric_column_names(&self) -> Vec<String> {
        self.numeric_columns().map(|c| c.name.clone()).collect()
    }

    /// Numeric values of a named column; `None` if absent or non-numeric.
    pub fn numeric_values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column(name).and_then(Column::numeric_values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec![
                Column::new("Age", ColumnData::Integer(vec![19, 21, 35])),
                Column::new("Income", ColumnData::Float(vec![Some(15.0), None, Some(16.5)])),
                Column::new(
                    "Gender",
                    ColumnData::Text(vec![Some("Male".into()), Some("Female".into()), None]),
                ),
            ],
            3,
        )
        .unwrap()
    }

    #[test]
    fn shape_and_numeric_columns() {
        let table = sample();
        assert_eq!(table.shape(), (3, 3));
        assert_eq!(table.numeric_column_names(), vec!["Age", "Income"]);
        assert!(table.numeric_values("Gender").is_none());
        assert!(table.numeric_values("Nope").is_none());
    }

    #[test]
    fn cells_render_like_a_dataframe() {
        let table = sample();
        let income = table.column("Income").unwrap();
        assert_eq!(income.cell(0).to_string(), "15.0");
        assert_eq!(income.cell(1).to_string(), "NaN");
        assert_eq!(income.cell(2).to_string(), "16.5");
        assert_eq!(table.column("Gender").unwrap().cell(2), CellValue::Missing);
        assert_eq!(CellValue::Bool(true).to_string(), "True");
    }

    #[test]
    fn present_values_drop_missing() {
        let table = sample();
        assert_eq!(table.column("Income").unwrap().present_values(), vec![15.0, 16.5]);
        assert!(table.column("Gender").unwrap().present_values().is_empty());
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let result = Table::new(vec![Column::new("a", ColumnData::Integer(vec![1, 2]))], 3);
        assert!(result.is_err());
    }
}
