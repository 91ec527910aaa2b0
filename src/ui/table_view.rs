use eframe::egui::{self, Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

const LINE_HEIGHT: f32 = 18.0;

/// Plain text grid: a leading row-label column, then one column per header.
pub fn text_table(
    ui: &mut Ui,
    id: &str,
    headers: &[String],
    row_labels: &[String],
    rows: &[Vec<String>],
) {
    egui::ScrollArea::horizontal().id_salt(id).show(ui, |ui: &mut Ui| {
        ui.push_id(id, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .cell_layout(Layout::left_to_right(Align::Center))
                .column(Column::auto().at_least(40.0))
                .columns(Column::auto().at_least(70.0).resizable(true), headers.len())
                .header(header_height(headers), |mut header| {
                    header.col(|ui: &mut Ui| {
                        ui.label("");
                    });
                    for name in headers {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(20.0, rows.len(), |mut row| {
                        let i = row.index();
                        let label = row_labels.get(i).map(String::as_str).unwrap_or_default();
                        row.col(|ui: &mut Ui| {
                            ui.strong(label);
                        });
                        for cell in &rows[i] {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell);
                            });
                        }
                    });
                });
        });
    });
}

/// Tall enough for the header with the most lines.
fn header_height(headers: &[String]) -> f32 {
    let lines = headers.iter().map(|h| h.lines().count()).max().unwrap_or(1).max(1);
    LINE_HEIGHT * lines as f32 + 4.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_grows_with_line_count() {
        let single = header_height(&["Age".to_string()]);
        let double = header_height(&["Age\nint64".to_string(), "Gender\nobject".to_string()]);
        assert_eq!(single, 22.0);
        assert_eq!(double, 40.0);
        assert_eq!(header_height(&[]), 22.0);
    }
}
