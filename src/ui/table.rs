use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Table;

// ---------------------------------------------------------------------------
// Table preview
// ---------------------------------------------------------------------------

/// Show the first `rows` rows of `table` with a header and row index.
pub fn preview(ui: &mut Ui, id: &str, table: &Table, rows: usize) {
    let head = table.head(rows);
    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .column(Column::auto().at_least(24.0))
                .columns(Column::auto().at_least(60.0), head.columns.len())
                .header(20.0, |mut header| {
                    header.col(|_ui| {});
                    for name in &head.columns {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for (i, row) in head.rows.iter().enumerate() {
                        body.row(18.0, |mut cells| {
                            cells.col(|ui| {
                                ui.weak(i.to_string());
                            });
                            for cell in row {
                                cells.col(|ui| {
                                    ui.label(cell.to_string());
                                });
                            }
                        });
                    }
                });
        });
    });
    ui.weak(format!("{} rows × {} columns", table.len(), table.columns.len()));
}
