use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "dashboard.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Optional settings read from `dashboard.json`. Every field has a default,
/// so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV loaded when nothing has been uploaded.
    pub default_dataset: PathBuf,
    /// Rows shown in the head preview.
    pub head_rows: usize,
    /// Operation budget for one custom script run.
    pub script_max_operations: u64,
    /// Largest string a script may build, in bytes.
    pub script_max_string_size: usize,
    /// Largest array a script may build.
    pub script_max_array_size: usize,
    /// Largest object map a script may build.
    pub script_max_map_size: usize,
    /// Initial window size in points.
    pub window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_dataset: PathBuf::from("Mall_Customers.csv"),
            head_rows: 5,
            script_max_operations: 5_000_000,
            script_max_string_size: 16 * 1024 * 1024,
            script_max_array_size: 1_000_000,
            script_max_map_size: 100_000,
            window_size: [1280.0, 860.0],
        }
    }
}

impl DashboardConfig {
    /// Read a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Like [`DashboardConfig::load`], but logs and falls back to defaults
    /// on a broken file.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Ignoring invalid config: {e:#}");
                Self::default()
            }
        }
    }
}
