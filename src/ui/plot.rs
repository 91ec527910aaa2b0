use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, Color32, FontId, Key, Modifiers, Rect, Sense, Ui, pos2, vec2};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points,
};

use crate::chart::{
    self, ChartKind, ChartOutput, ChartRequest, ColorBar, DEFAULT_SERIES_COLOR, Figure, FigureBody,
};
use crate::color;
use crate::script::{OutputItem, ScriptReport};
use crate::state::AppState;

const PLOT_HEIGHT: f32 = 420.0;
const KDE_COLOR: Color32 = Color32::from_rgb(239, 85, 59);

// ---------------------------------------------------------------------------
// Visualization tab
// ---------------------------------------------------------------------------

pub fn visualization_tab(ui: &mut Ui, state: &mut AppState) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Visualization Section");
            ui.add_space(4.0);

            let mut kind = state.chart_request.kind();
            egui::ComboBox::from_label("Choose Visualization Type")
                .selected_text(kind.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for k in ChartKind::ALL {
                        ui.selectable_value(&mut kind, k, k.label());
                    }
                });
            state.set_chart_kind(kind);

            selection_controls(ui, state);
            ui.add_space(8.0);

            match &state.chart_output {
                Some(ChartOutput::Figure(figure)) => figure_plot(ui, "chart", figure),
                Some(ChartOutput::Warning(text)) => super::warning(ui, text),
                Some(ChartOutput::Script(report)) => script_report(ui, report),
                None => {}
            }
        });
}

/// Column pickers for the current kind; edits go through a copy of the
/// request so unchanged frames do not rebuild anything.
fn selection_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let options = chart::options(state.chart_request.kind(), table);
    let mut request = state.chart_request.clone();
    let mut run = false;

    match &mut request {
        ChartRequest::Scatter { x, y, color } => {
            if options.axis.len() >= 2 {
                column_combo(ui, "X-axis", x, &options.axis, false);
                column_combo(ui, "Y-axis", y, &options.axis, false);
                column_combo(ui, "Color (optional)", color, &options.color, true);
            }
        }
        ChartRequest::Bar { x, y } => {
            column_combo(ui, "X-axis", x, &options.axis, false);
            column_combo(ui, "Y-axis", y, &options.axis, false);
        }
        ChartRequest::Distribution { column } => {
            if !options.axis.is_empty() {
                column_combo(ui, "Select column", column, &options.axis, false);
            }
        }
        ChartRequest::Custom { source } => {
            run = script_editor(ui, source);
        }
    }

    state.update_request(request);
    if run {
        state.run_chart();
    }
}

fn column_combo(
    ui: &mut Ui,
    label: &str,
    selected: &mut Option<String>,
    choices: &[String],
    allow_none: bool,
) {
    let text = selected.as_deref().unwrap_or("None");
    egui::ComboBox::from_label(label)
        .selected_text(text)
        .show_ui(ui, |ui: &mut Ui| {
            if allow_none {
                ui.selectable_value(selected, None, "None");
            }
            for choice in choices {
                ui.selectable_value(selected, Some(choice.clone()), choice);
            }
        });
}

/// Code editor plus Run button. Returns true when a run was requested.
fn script_editor(ui: &mut Ui, source: &mut String) -> bool {
    ui.label("Write your own plotting code below:");
    let editor_id = ui.make_persistent_id("custom_script");

    // Taken before the editor sees it, otherwise Enter inserts a newline.
    let shortcut = ui.memory(|m| m.has_focus(editor_id))
        && ui.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::Enter));

    ui.add(
        egui::TextEdit::multiline(source)
            .id(editor_id)
            .code_editor()
            .desired_rows(8)
            .desired_width(f32::INFINITY),
    );
    let clicked = ui
        .horizontal(|ui: &mut Ui| {
            let clicked = ui.button("Run").clicked();
            ui.small("Ctrl+Enter");
            clicked
        })
        .inner;
    clicked || shortcut
}

fn script_report(ui: &mut Ui, report: &ScriptReport) {
    for (i, item) in report.items.iter().enumerate() {
        match item {
            OutputItem::Text(text) => {
                ui.label(egui::RichText::new(text).monospace());
            }
            OutputItem::Warning(text) => super::warning(ui, text),
            OutputItem::Error(text) => super::error(ui, text),
            OutputItem::Figure(figure) => figure_plot(ui, &format!("script_figure_{i}"), figure),
        }
    }
    if let Some(err) = &report.error {
        super::error(ui, &err.to_string());
    }
}

// ---------------------------------------------------------------------------
// Figure rendering
// ---------------------------------------------------------------------------

pub fn figure_plot(ui: &mut Ui, id: &str, figure: &Figure) {
    if let Some(title) = &figure.title {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.strong(title);
        });
    }
    if let FigureBody::Scatter {
        color_bar: Some(bar),
        ..
    } = &figure.body
    {
        color_bar_strip(ui, bar);
    }

    let mut plot = Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(figure.x_label.as_str())
        .y_axis_label(figure.y_label.as_str());

    match &figure.body {
        FigureBody::Bar {
            x_categories,
            y_categories,
            ..
        } => {
            if let Some(labels) = x_categories.clone() {
                plot = plot.x_axis_formatter(category_formatter(labels));
            }
            if let Some(labels) = y_categories.clone() {
                plot = plot.y_axis_formatter(category_formatter(labels));
            }
        }
        FigureBody::Box { boxes } => {
            let labels = boxes.iter().map(|b| b.label.clone()).collect();
            plot = plot.x_axis_formatter(category_formatter(labels));
        }
        _ => {}
    }

    plot.show(ui, |plot_ui| match &figure.body {
        FigureBody::Scatter { series, .. } => {
            for s in series {
                plot_ui.points(
                    Points::new(PlotPoints::from(s.points.clone()))
                        .name(&s.name)
                        .color(s.color)
                        .radius(3.0),
                );
            }
        }
        FigureBody::Bar { bars, width, .. } => {
            let bars = bars
                .iter()
                .map(|b| Bar::new(b.position, b.height).width(*width))
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).color(DEFAULT_SERIES_COLOR));
        }
        FigureBody::Histogram(hist) => {
            let bars = hist
                .bins
                .iter()
                .map(|b| Bar::new(b.center(), b.count as f64).width(b.width()))
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).color(DEFAULT_SERIES_COLOR).name("count"));
            if !hist.density.is_empty() {
                plot_ui.line(
                    Line::new(PlotPoints::from(hist.density.clone()))
                        .color(KDE_COLOR)
                        .width(2.0)
                        .name("KDE"),
                );
            }
        }
        FigureBody::Line { points } => {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .color(DEFAULT_SERIES_COLOR)
                    .width(1.5),
            );
        }
        FigureBody::Box { boxes } => {
            let palette = color::generate_palette(boxes.len());
            for (i, (b, fill)) in boxes.iter().zip(palette).enumerate() {
                let x = i as f64;
                let elem = BoxElem::new(
                    x,
                    BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
                )
                .box_width(0.5)
                .name(&b.label);
                plot_ui.box_plot(BoxPlot::new(vec![elem]).color(fill).name(&b.label));
                if !b.outliers.is_empty() {
                    let outliers: Vec<[f64; 2]> = b.outliers.iter().map(|v| [x, *v]).collect();
                    plot_ui.points(Points::new(PlotPoints::from(outliers)).color(fill).radius(2.5));
                }
            }
        }
    });
}

/// Label integer grid marks with category names; other marks stay blank.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let v = mark.value;
        if v < 0.0 || (v - v.round()).abs() > 1e-6 {
            return String::new();
        }
        labels.get(v.round() as usize).cloned().unwrap_or_default()
    }
}

/// Horizontal gradient for a continuous colour column.
fn color_bar_strip(ui: &mut Ui, bar: &ColorBar) {
    const STEPS: usize = 48;
    let width = ui.available_width().min(320.0);
    let (rect, _) = ui.allocate_exact_size(vec2(width, 30.0), Sense::hover());
    let painter = ui.painter_at(rect);
    let strip = Rect::from_min_size(rect.min + vec2(0.0, 14.0), vec2(width, 12.0));
    let step = width / STEPS as f32;

    for i in 0..STEPS {
        let t = (i as f64 + 0.5) / STEPS as f64;
        let cell = Rect::from_min_size(
            pos2(strip.min.x + i as f32 * step, strip.min.y),
            vec2(step + 0.5, strip.height()),
        );
        painter.rect_filled(cell, 0.0, color::sequential(t));
    }

    let font = FontId::proportional(11.0);
    let text_color = ui.visuals().text_color();
    painter.text(rect.left_top(), Align2::LEFT_TOP, format!("{:.2}", bar.min), font.clone(), text_color);
    painter.text(rect.center_top(), Align2::CENTER_TOP, &bar.column, font.clone(), text_color);
    painter.text(rect.right_top(), Align2::RIGHT_TOP, format!("{:.2}", bar.max), font, text_color);
}
