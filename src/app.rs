use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{charts, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TeleLensApp {
    pub state: AppState,
}

impl TeleLensApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for TeleLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: upload + filter form ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tables, downloads, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| central(ui, &mut self.state));
        });
    }
}

fn central(ui: &mut Ui, state: &mut AppState) {
    ui.heading(&state.config.title);
    ui.separator();

    let Some(session) = &state.session else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a .csv or .xlsx file to start  (File → Open…)");
        });
        return;
    };
    let rows = state.config.preview_rows;

    ui.heading("Raw data");
    table::preview(ui, "raw_preview", &session.raw, rows);

    let mut download = None;
    if let (true, Some(output)) = (session.submitted, &session.output) {
        ui.add_space(8.0);
        ui.heading("Filtered data");
        table::preview(ui, "filtered_preview", &output.filtered, rows);
        ui.horizontal(|ui: &mut Ui| {
            if ui.button("📥 Download filtered table (Excel)").clicked() {
                download = Some(true);
            }
            if ui.button("📥 Download filtered table (CSV)").clicked() {
                download = Some(false);
            }
        });
    }

    ui.add_space(8.0);
    ui.heading("Proportions");
    charts::proportion_charts(ui, state);

    if let Some(spreadsheet) = download {
        panels::save_file_dialog(state, spreadsheet);
    }
}
