use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::ALL_SENTINEL;
use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Left side panel – filter form
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    if let Some(path) = &state.config.branding_image {
        let uri = format!("file://{}", path.display());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add(
                egui::Image::new(uri)
                    .max_width(ui.available_width() * 0.8)
                    .max_height(120.0),
            );
        });
        ui.add_space(4.0);
    }

    ui.heading("Upload");
    if ui.button("Open file (.csv / .xlsx)…").clicked() {
        open_file_dialog(state);
    }
    ui.separator();

    if state.session.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ui.heading("Filters");
    let mut apply = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Chart type");
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut state.chart_kind, ChartKind::Bars, "Bars");
                ui.radio_value(&mut state.chart_kind, ChartKind::Pie, "Pie");
            });
            ui.separator();

            let Some(session) = state.session.as_mut() else {
                return;
            };
            let form = &mut session.form;

            // ---- Numeric range ----
            ui.strong(&form.range_label);
            match form.range_bounds {
                Some((min, max)) => {
                    let (mut low, mut high) = form.range;
                    ui.add(egui::Slider::new(&mut low, min..=max).integer().text("from"));
                    ui.add(egui::Slider::new(&mut high, min..=max).integer().text("to"));
                    form.set_range(low, high);
                }
                None => {
                    ui.label(
                        RichText::new(format!("no numeric '{}' column", form.range_column))
                            .color(Color32::RED),
                    );
                }
            }
            ui.separator();

            // ---- Per-column multiselects (collapsible) ----
            for choice in &mut form.categories {
                let summary = if choice.all {
                    ALL_SENTINEL.to_string()
                } else {
                    format!("{}/{}", choice.chosen.len(), choice.options.len())
                };
                let header_text = format!("{}  ({summary})", choice.label);

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(&choice.column)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if choice.options.is_empty() {
                            ui.label(
                                RichText::new(format!("column '{}' not found", choice.column))
                                    .color(Color32::RED),
                            );
                        }
                        ui.checkbox(&mut choice.all, ALL_SENTINEL);

                        for val in &choice.options {
                            let mut checked = choice.chosen.contains(val);
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                if checked {
                                    choice.chosen.insert(val.clone());
                                } else {
                                    choice.chosen.remove(val);
                                }
                            }
                        }
                    });
            }

            ui.separator();
            apply = ui.button("Apply filters").clicked();
        });

    if apply {
        if let Err(e) = state.submit() {
            state.report("Failed to apply filters", &e);
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = &state.session {
            let visible = match (&session.output, session.submitted) {
                (Some(out), true) => out.filtered.len(),
                _ => session.raw.len(),
            };
            ui.label(format!(
                "{}: {} rows loaded, {} after filters",
                session.file_name,
                session.raw.len(),
                visible
            ));
            let (loads, runs) = state.cache_stats();
            ui.weak(format!(
                "cache {}/{} loads, {}/{} filter runs",
                loads.hits,
                loads.hits + loads.misses,
                runs.hits,
                runs.hits + runs.misses
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("Supported files", &["csv", "xlsx", "xls", "ods", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Spreadsheet", &["xlsx", "xls", "ods"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open_path(&path) {
            state.report("Failed to load file", &e);
        }
    }
}

/// Ask for a destination and write the current table in one of the export
/// encodings.
pub fn save_file_dialog(state: &mut AppState, spreadsheet: bool) {
    let (file_name, filter, ext) = if spreadsheet {
        ("filtered_data.xlsx", "Excel", "xlsx")
    } else {
        ("filtered_data.csv", "CSV", "csv")
    };

    let Some(path) = rfd::FileDialog::new()
        .set_title("Download filtered table")
        .set_file_name(file_name)
        .add_filter(filter, &[ext])
        .save_file()
    else {
        return;
    };

    let bytes = if spreadsheet {
        state.export_spreadsheet()
    } else {
        state.export_delimited()
    };
    let written = bytes.and_then(|bytes| {
        std::fs::write(&path, &bytes)
            .map_err(anyhow::Error::from)
            .map(|_| bytes.len())
    });
    match written {
        Ok(n) => log::info!("Wrote {n} bytes to {}", path.display()),
        Err(e) => state.report("Export failed", &e),
    }
}
