use std::path::Path;

use eframe::egui::TextureHandle;

use crate::chart::{self, ChartKind, ChartOutput, ChartRequest};
use crate::config::DashboardConfig;
use crate::data::loader::{self, Notice, Upload};
use crate::data::model::Table;
use crate::error::DataUnavailable;
use crate::overview::Overview;
use crate::script::ScriptLimits;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    ModelResults,
    Visualizations,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Overview, Tab::ModelResults, Tab::Visualizations];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Data Overview",
            Tab::ModelResults => "Model Results",
            Tab::Visualizations => "Visualizations",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Everything derived from the
/// table is rebuilt on [`AppState::reload`].
pub struct AppState {
    pub config: DashboardConfig,

    /// User-supplied file; `None` means "use the default dataset".
    pub upload: Option<Upload>,

    /// Source notice for the side panel. `None` after a failed upload.
    pub notice: Option<Notice>,

    /// Loaded table (None when loading failed).
    pub table: Option<Table>,

    /// Set when no table could be obtained; the main area shows only this.
    pub load_error: Option<DataUnavailable>,

    pub overview: Option<Overview>,

    /// Heatmap raster uploaded to the GPU, built lazily by the overview tab.
    pub heatmap_texture: Option<TextureHandle>,

    pub tab: Tab,

    pub chart_request: ChartRequest,

    pub chart_output: Option<ChartOutput>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = Self {
            config,
            upload: None,
            notice: None,
            table: None,
            load_error: None,
            overview: None,
            heatmap_texture: None,
            tab: Tab::Overview,
            chart_request: ChartRequest::defaults(ChartKind::Scatter, &Table::default()),
            chart_output: None,
            status_message: None,
        };
        state.reload();
        state
    }

    /// Run the loader for the current source and rebuild everything derived
    /// from the table.
    pub fn reload(&mut self) {
        self.heatmap_texture = None;
        self.chart_output = None;

        match loader::load(self.upload.as_ref(), &self.config.default_dataset) {
            Ok(loaded) => {
                self.overview = Some(Overview::build(&loaded.table, self.config.head_rows));
                self.chart_request = ChartRequest::defaults(self.chart_request.kind(), &loaded.table);
                self.table = Some(loaded.table);
                self.notice = Some(loaded.notice);
                self.load_error = None;
                self.rebuild_chart();
            }
            Err(e) => {
                // The default source is announced before it is read; an
                // upload only once it parsed.
                self.notice = self
                    .upload
                    .is_none()
                    .then(|| Notice::for_source(None, &self.config.default_dataset));
                self.table = None;
                self.overview = None;
                self.load_error = Some(e);
            }
        }
    }

    /// Ingest a newly uploaded file.
    pub fn set_upload(&mut self, upload: Upload) {
        self.upload = Some(upload);
        self.status_message = None;
        self.reload();
    }

    /// Drop the upload and fall back to the default dataset.
    pub fn clear_upload(&mut self) {
        self.upload = None;
        self.reload();
    }

    /// Read a picked or dropped file and load it.
    pub fn open_path(&mut self, path: &Path) {
        match Upload::from_path(path) {
            Ok(upload) => self.set_upload(upload),
            Err(e) => {
                log::error!("Failed to read file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Switch chart kind; the previous kind's selections are discarded.
    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        if kind == self.chart_request.kind() {
            return;
        }
        let Some(table) = &self.table else {
            return;
        };
        self.chart_request = ChartRequest::defaults(kind, table);
        self.rebuild_chart();
    }

    /// Store edited selections. Custom scripts only run on request.
    pub fn update_request(&mut self, request: ChartRequest) {
        if request == self.chart_request {
            return;
        }
        self.chart_request = request;
        if self.chart_request.kind() != ChartKind::Custom {
            self.rebuild_chart();
        }
    }

    /// Re-run the custom script (or redraw the current chart).
    pub fn run_chart(&mut self) {
        self.rebuild_chart();
    }

    fn script_limits(&self) -> ScriptLimits {
        ScriptLimits {
            max_operations: self.config.script_max_operations,
            max_string_size: self.config.script_max_string_size,
            max_array_size: self.config.script_max_array_size,
            max_map_size: self.config.script_max_map_size,
        }
    }

    fn rebuild_chart(&mut self) {
        let limits = self.script_limits();
        self.chart_output = self
            .table
            .as_ref()
            .map(|table| chart::build(table, &self.chart_request, &limits));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::NO_DATASET;

    fn config_in(dir: &Path) -> DashboardConfig {
        DashboardConfig {
            default_dataset: dir.join("Mall_Customers.csv"),
            ..DashboardConfig::default()
        }
    }

    fn upload(text: &str) -> Upload {
        Upload {
            name: "upload.csv".into(),
            bytes: text.as_bytes().to_vec(),
        }
    }

    #[test]
    fn missing_data_halts_everything_downstream() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(config_in(dir.path()));
        assert_eq!(state.load_error.as_ref().unwrap().message, NO_DATASET);
        assert!(state.table.is_none());
        assert!(state.overview.is_none());
        assert!(state.chart_output.is_none());
    }

    #[test]
    fn upload_then_clear_returns_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(config_in(dir.path()));

        state.set_upload(upload("a,b\n1,2\n3,4\n"));
        assert!(state.load_error.is_none());
        assert_eq!(state.overview.as_ref().unwrap().shape, (2, 2));
        assert_eq!(state.notice, Some(Notice::Uploaded("upload.csv".into())));
        assert!(matches!(state.chart_output, Some(ChartOutput::Figure(_))));

        state.clear_upload();
        assert!(state.load_error.is_some());
        assert_eq!(
            state.notice,
            Some(Notice::UsingDefault(dir.path().join("Mall_Customers.csv")))
        );
    }

    #[test]
    fn broken_upload_does_not_report_success() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(config_in(dir.path()));
        state.set_upload(upload("a,b\n1,2\n3,4\n"));
        assert!(state.notice.is_some());

        state.set_upload(upload("a\n1,2,3\n"));
        let err = state.load_error.as_ref().unwrap();
        assert!(err.message.contains("Could not read 'upload.csv'"));
        assert!(state.notice.is_none());
        assert!(state.table.is_none());
    }

    #[test]
    fn switching_kind_discards_selections() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(config_in(dir.path()));
        state.set_upload(upload("a,b,c\n1,2,x\n3,4,y\n"));

        state.update_request(ChartRequest::Scatter {
            x: Some("b".into()),
            y: Some("a".into()),
            color: Some("c".into()),
        });
        state.set_chart_kind(ChartKind::Bar);
        state.set_chart_kind(ChartKind::Scatter);
        assert_eq!(
            state.chart_request,
            ChartRequest::Scatter {
                x: Some("a".into()),
                y: Some("b".into()),
                color: None
            }
        );
    }

    #[test]
    fn custom_script_runs_on_request_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(config_in(dir.path()));
        state.set_upload(upload("a\n1\n"));
        state.set_chart_kind(ChartKind::Custom);

        state.update_request(ChartRequest::Custom {
            source: "st.write(1/0)".into(),
        });
        // Still showing the default script's output.
        let Some(ChartOutput::Script(before)) = &state.chart_output else {
            panic!("expected script output");
        };
        assert!(!before.error.as_ref().unwrap().message.contains("ivision by zero"));

        state.run_chart();
        let Some(ChartOutput::Script(after)) = &state.chart_output else {
            panic!("expected script output");
        };
        assert!(after.error.as_ref().unwrap().message.contains("ivision by zero"));
        // Other tabs are untouched.
        assert_eq!(state.overview.as_ref().unwrap().shape, (1, 1));
    }
}
