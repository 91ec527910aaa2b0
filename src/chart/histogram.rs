use std::f64::consts::PI;

use crate::data::stats::{quantile_sorted, sample_std};

/// Points on the density overlay.
const KDE_GRID: usize = 200;
/// Above this many Freedman–Diaconis bins the Sturges count is used instead.
const MAX_BINS: usize = 1000;

// ---------------------------------------------------------------------------
// Histogram with density overlay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl Bin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bins: Vec<Bin>,
    /// Kernel density estimate scaled to counts; empty when undefined.
    pub density: Vec<[f64; 2]>,
}

impl Histogram {
    /// Bin the values and overlay a Gaussian KDE. `None` for an empty sample.
    pub fn new(values: &[f64]) -> Option<Self> {
        let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let edges = auto_bin_edges(&values)?;
        let bins = count_bins(&values, &edges);

        let bin_width = edges[1] - edges[0];
        let scale = values.len() as f64 * bin_width;
        let density = kde(&values, KDE_GRID)
            .into_iter()
            .map(|[x, d]| [x, d * scale])
            .collect();

        Some(Histogram { bins, density })
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Equal-width bin edges. The width is the smaller of the Sturges and
/// Freedman–Diaconis estimates; Sturges alone when the IQR is zero or when
/// Freedman–Diaconis asks for more than [`MAX_BINS`] bins (a few far
/// outliers). A zero-range sample gets one unit-wide bin centred on the value.
pub fn auto_bin_edges(values: &[f64]) -> Option<Vec<f64>> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);

    if min == max {
        return Some(vec![min - 0.5, max + 0.5]);
    }

    let n = sorted.len() as f64;
    let sturges_bins = (n.log2() + 1.0).ceil().max(1.0) as usize;
    let iqr = quantile_sorted(&sorted, 0.75)? - quantile_sorted(&sorted, 0.25)?;
    let fd = 2.0 * iqr * n.powf(-1.0 / 3.0);
    // Halved so that the span of two extreme finite values stays finite.
    let fd_bins = (max / 2.0 - min / 2.0) / (fd / 2.0);

    let n_bins = if fd > 0.0 && fd_bins.is_finite() && fd_bins <= MAX_BINS as f64 {
        (fd_bins.ceil() as usize).max(sturges_bins)
    } else {
        sturges_bins
    };
    Some(
        (0..=n_bins)
            .map(|i| {
                let t = i as f64 / n_bins as f64;
                min * (1.0 - t) + max * t
            })
            .collect(),
    )
}

/// Count values into the bins defined by `edges`; the last bin is closed.
fn count_bins(values: &[f64], edges: &[f64]) -> Vec<Bin> {
    let n_bins = edges.len().saturating_sub(1);
    let mut counts = vec![0usize; n_bins];
    if n_bins == 0 {
        return Vec::new();
    }
    let (first, last) = (edges[0], edges[n_bins]);

    for &v in values {
        if v < first || v > last {
            continue;
        }
        let t = (v / 2.0 - first / 2.0) / (last / 2.0 - first / 2.0);
        let idx = (t * n_bins as f64).floor() as usize;
        counts[idx.min(n_bins - 1)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: edges[i],
            end: edges[i + 1],
            count,
        })
        .collect()
}

/// Gaussian kernel density over the data range with Scott's bandwidth
/// (`n^(-1/5)·σ`). Empty when σ is zero, overflows or is undefined.
pub fn kde(values: &[f64], grid_points: usize) -> Vec<[f64; 2]> {
    let Some(std) = sample_std(values) else {
        return Vec::new();
    };
    if std == 0.0 || !std.is_finite() || grid_points < 2 {
        return Vec::new();
    }
    let n = values.len() as f64;
    let bw = std * n.powf(-0.2);
    let norm = 1.0 / (n * bw * (2.0 * PI).sqrt());

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (max - min) / (grid_points - 1) as f64;

    (0..grid_points)
        .map(|i| {
            let x = min + step * i as f64;
            let sum: f64 = values
                .iter()
                .map(|xi| (-0.5 * ((x - xi) / bw).powi(2)).exp())
                .sum();
            [x, sum * norm]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_value_lands_in_a_bin() {
        let values: Vec<f64> = (0..100).map(|i| (i as f64).sqrt()).collect();
        let h = Histogram::new(&values).unwrap();
        assert_eq!(h.total(), 100);
        assert_eq!(h.bins.first().unwrap().start, 0.0);
        assert_eq!(h.bins.last().unwrap().end, 99f64.sqrt());
    }

    #[test]
    fn sturges_used_when_iqr_is_zero() {
        // IQR = 0, range = 9, n = 8 → Sturges width 9/4 → 4 bins.
        let values = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 10.0];
        let edges = auto_bin_edges(&values).unwrap();
        assert_eq!(edges.len(), 5);
    }

    #[test]
    fn far_outlier_keeps_bin_count_bounded() {
        let values = [1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 1e300];
        let h = Histogram::new(&values).unwrap();
        assert!(h.bins.len() <= MAX_BINS);
        assert_eq!(h.total(), 7);

        let mut incomes: Vec<f64> = (0..200).map(|i| 15.0 + (i % 121) as f64).collect();
        incomes.push(1e9);
        let h = Histogram::new(&incomes).unwrap();
        assert!(h.bins.len() <= MAX_BINS, "{} bins", h.bins.len());
        assert_eq!(h.total(), 201);
        assert_eq!(h.bins.last().unwrap().end, 1e9);
    }

    #[test]
    fn extreme_range_stays_finite() {
        let h = Histogram::new(&[-f64::MAX, 0.0, f64::MAX]).unwrap();
        assert_eq!(h.total(), 3);
        assert!(h.bins.iter().all(|b| b.start.is_finite() && b.end.is_finite()));
        assert!(h.density.is_empty());
    }

    #[test]
    fn constant_sample_gets_one_bin_and_no_density() {
        let h = Histogram::new(&[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(h.bins.len(), 1);
        assert_eq!(h.bins[0].start, 2.5);
        assert_eq!(h.bins[0].end, 3.5);
        assert_eq!(h.bins[0].count, 3);
        assert!(h.density.is_empty());
    }

    #[test]
    fn empty_sample_has_no_histogram() {
        assert!(Histogram::new(&[]).is_none());
        assert!(Histogram::new(&[f64::NAN]).is_none());
    }

    #[test]
    fn density_integrates_to_roughly_one() {
        let values: Vec<f64> = (0..500).map(|i| ((i * 37) % 101) as f64).collect();
        let curve = kde(&values, 400);
        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1][0] - w[0][0]) * (w[0][1] + w[1][1]) / 2.0)
            .sum();
        // The curve is clipped to the data range, so a little mass is lost.
        assert!(area > 0.85 && area < 1.0, "area = {area}");
    }
}
