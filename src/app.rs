use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::{AppState, Tab};
use crate::ui::{metrics, overview, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        panels::handle_dropped_files(ctx, &mut self.state);

        // ---- Top panel: title and tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            panels::footer(ui);
        });

        // ---- Left side panel: data controls ----
        egui::SidePanel::left("data_controls")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active tab ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(err) = &self.state.load_error {
                panels::load_error(ui, err);
                return;
            }
            match self.state.tab {
                Tab::Overview => overview::overview_tab(ui, &mut self.state),
                Tab::ModelResults => metrics::metrics_tab(ui),
                Tab::Visualizations => plot::visualization_tab(ui, &mut self.state),
            }
        });
    }
}
