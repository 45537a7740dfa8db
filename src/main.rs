mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::Path;

use app::TeleLensApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match DashboardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e:#}");
            std::process::exit(2);
        }
    };
    let title = config.title.clone();
    let mut state = AppState::new(config);

    // Optional dataset to open on startup.
    if let Some(path) = std::env::args_os().nth(1) {
        if let Err(e) = state.open_path(Path::new(&path)) {
            state.report("Failed to load file", &e);
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            // Install image loaders so the sidebar branding image can render.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(TeleLensApp::new(state)))
        }),
    )
}
