// ---------------------------------------------------------------------------
// Model results: fixed display values
// ---------------------------------------------------------------------------

/// Headline numbers for the model results tab. Not derived from the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMetrics {
    pub accuracy: f64,
    pub silhouette: f64,
    pub clusters: u32,
}

pub const MODEL_METRICS: FixedMetrics = FixedMetrics {
    accuracy: 0.89,
    silhouette: 0.71,
    clusters: 5,
};

/// One labelled tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricTile {
    pub label: &'static str,
    pub value: String,
}

impl FixedMetrics {
    pub fn tiles(&self) -> [MetricTile; 3] {
        [
            MetricTile {
                label: "Model Accuracy",
                value: format!("{:.2}%", self.accuracy * 100.0),
            },
            MetricTile {
                label: "Silhouette Score",
                value: format!("{:.2}", self.silhouette),
            },
            MetricTile {
                label: "Clusters Formed",
                value: self.clusters.to_string(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_are_formatted() {
        let tiles = MODEL_METRICS.tiles();
        assert_eq!(tiles[0].value, "89.00%");
        assert_eq!(tiles[1].value, "0.71");
        assert_eq!(tiles[2].value, "5");
        assert_eq!(tiles[2].label, "Clusters Formed");
    }
}
