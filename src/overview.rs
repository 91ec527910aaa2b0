use crate::data::correlation::{CorrelationMatrix, correlation_matrix};
use crate::data::model::Table;
use crate::data::stats::{SummaryStatistics, describe};

/// Shown instead of the heatmap when no column is numeric.
pub const NO_NUMERIC_HEATMAP: &str = "No numeric columns available for heatmap.";

// ---------------------------------------------------------------------------
// Data overview tab content
// ---------------------------------------------------------------------------

/// Leading rows rendered as text, with column headers.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadView {
    pub columns: Vec<String>,
    pub dtypes: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl HeadView {
    pub fn new(table: &Table, n: usize) -> Self {
        let rows = (0..table.row_count().min(n))
            .map(|row| table.columns().iter().map(|c| c.cell(row).to_string()).collect())
            .collect();
        HeadView {
            columns: table.column_names(),
            dtypes: table.columns().iter().map(|c| c.data.dtype()).collect(),
            rows,
        }
    }
}

/// Everything the overview tab shows, derived from one table.
#[derive(Debug, Clone)]
pub struct Overview {
    pub shape: (usize, usize),
    pub head: HeadView,
    pub summary: SummaryStatistics,
    /// `None` when the table has no numeric columns.
    pub correlation: Option<CorrelationMatrix>,
}

impl Overview {
    pub fn build(table: &Table, head_rows: usize) -> Self {
        Overview {
            shape: table.shape(),
            head: HeadView::new(table, head_rows),
            summary: describe(table),
            correlation: correlation_matrix(table),
        }
    }

    pub fn shape_text(&self) -> String {
        format!("Shape: ({}, {})", self.shape.0, self.shape.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;

    fn customers(rows: usize) -> Table {
        let mut csv = String::from("CustomerID,Gender,Region,Income,Score\n");
        for i in 0..rows {
            let gender = if i % 2 == 0 { "Male" } else { "Female" };
            csv.push_str(&format!("C{i},{gender},North,{}.5,{}\n", 20 + i, (i * 7) % 100));
        }
        parse_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn two_hundred_rows_two_numeric() {
        let overview = Overview::build(&customers(200), 5);
        assert_eq!(overview.shape, (200, 5));
        assert_eq!(overview.shape_text(), "Shape: (200, 5)");
        assert_eq!(overview.head.rows.len(), 5);
        assert_eq!(overview.summary.columns.len(), 2);
        let corr = overview.correlation.unwrap();
        assert_eq!(corr.size(), 2);
        assert_eq!(corr.labels, vec!["Income", "Score"]);
    }

    #[test]
    fn head_is_verbatim_and_short_tables_show_all_rows() {
        let overview = Overview::build(&customers(3), 5);
        assert_eq!(overview.head.rows.len(), 3);
        assert_eq!(overview.head.rows[0], vec!["C0", "Male", "North", "20.5", "0"]);
        assert_eq!(overview.head.dtypes, vec!["object", "object", "object", "float64", "int64"]);
    }

    #[test]
    fn text_only_table_has_no_heatmap() {
        let table = parse_csv("a,b\nx,y\nz,w\n".as_bytes()).unwrap();
        let overview = Overview::build(&table, 5);
        assert!(overview.summary.is_empty());
        assert!(overview.correlation.is_none());
    }
}
