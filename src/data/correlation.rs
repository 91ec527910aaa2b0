use super::model::Table;

// ---------------------------------------------------------------------------
// Pairwise Pearson correlation
// ---------------------------------------------------------------------------

/// Square matrix over the numeric columns. A cell is `None` when the pair
/// has fewer than two common observations or one side has zero variance.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major, `labels.len()²` entries.
    values: Vec<Option<f64>>,
}

impl CorrelationMatrix {
    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row * self.size() + col).copied().flatten()
    }

    /// Rows of the matrix, for iteration in the renderer.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<f64>]> {
        self.values.chunks(self.size().max(1))
    }
}

/// Correlation over all numeric columns, or `None` when there are none.
pub fn correlation_matrix(table: &Table) -> Option<CorrelationMatrix> {
    let columns: Vec<(String, Vec<Option<f64>>)> = table
        .numeric_columns()
        .filter_map(|c| c.numeric_values().map(|v| (c.name.clone(), v)))
        .collect();
    if columns.is_empty() {
        return None;
    }

    let n = columns.len();
    let mut values = vec![None; n * n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&columns[i].1, &columns[j].1);
            // A defined self-correlation is exactly one.
            let r = if i == j { r.map(|_| 1.0) } else { r };
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    Some(CorrelationMatrix {
        labels: columns.into_iter().map(|(name, _)| name).collect(),
        values,
    })
}

/// Pearson's r over rows where both sides are present, clamped to [-1, 1].
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if !x.is_nan() && !y.is_nan() => Some((*x, *y)),
            _ => None,
        })
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnData};

    fn table() -> Table {
        Table::new(
            vec![
                Column::new("a", ColumnData::Integer(vec![1, 2, 3, 4, 5])),
                Column::new(
                    "b",
                    ColumnData::Float(vec![Some(2.0), Some(4.1), None, Some(8.3), Some(9.9)]),
                ),
                Column::new("c", ColumnData::Integer(vec![5, 3, 4, 1, 2])),
                Column::new("label", ColumnData::Text(vec![None; 5])),
            ],
            5,
        )
        .unwrap()
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let m = correlation_matrix(&table()).unwrap();
        assert_eq!(m.labels, vec!["a", "b", "c"]);
        for i in 0..m.size() {
            assert_eq!(m.get(i, i), Some(1.0));
            for j in 0..m.size() {
                let v = m.get(i, j).unwrap();
                assert!((-1.0..=1.0).contains(&v));
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
    }

    #[test]
    fn perfect_linear_relationships() {
        let a = [Some(1.0), Some(2.0), Some(3.0)];
        let up = [Some(10.0), Some(20.0), Some(30.0)];
        let down = [Some(3.0), Some(2.0), Some(1.0)];
        assert!((pearson(&a, &up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&a, &down).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_values_are_excluded_per_pair() {
        let a = [Some(1.0), None, Some(3.0), Some(4.0)];
        let b = [Some(2.0), Some(100.0), Some(6.0), Some(8.0)];
        assert!((pearson(&a, &b).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_pairs_are_undefined() {
        let constant = [Some(1.0), Some(1.0), Some(1.0)];
        let other = [Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(pearson(&constant, &other), None);
        assert_eq!(pearson(&[Some(1.0)], &[Some(2.0)]), None);
    }

    #[test]
    fn no_numeric_columns_gives_no_matrix() {
        let t = Table::new(vec![Column::new("s", ColumnData::Text(vec![Some("x".into())]))], 1)
            .unwrap();
        assert!(correlation_matrix(&t).is_none());
    }
}
