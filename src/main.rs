//! Figure Forge - Main Entry Point
//!
//! Usage: `figure-forge [FIGURE]` opens FIGURE, or the demo figure when no
//! path is given.

use std::path::PathBuf;

use figure_forge::{config::AppState, frontend::ForgeApp, logging};

fn main() -> eframe::Result<()> {
    // Load application state (recent files, preferences, etc.)
    let mut app_state = AppState::load_or_default();
    let log = logging::init(app_state.debug_mode);

    tracing::info!("Starting Figure Forge {}", env!("CARGO_PKG_VERSION"));

    // Clean up any missing recent files
    app_state.cleanup_missing_files();

    let initial_path = std::env::args_os().nth(1).map(PathBuf::from);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Figure Forge"),
        ..Default::default()
    };

    eframe::run_native(
        "Figure Forge",
        native_options,
        Box::new(move |cc| {
            let mut style = (*cc.egui_ctx.style()).clone();
            style.visuals.window_shadow.offset = [0, 0];

            if app_state.ui_preferences.dark_mode {
                cc.egui_ctx.set_visuals(egui::Visuals::dark());
            } else {
                cc.egui_ctx.set_visuals(egui::Visuals::light());
            }
            cc.egui_ctx.set_style(style);

            let app = ForgeApp::new(cc, app_state, Some(log), initial_path)?;
            Ok(Box::new(app))
        }),
    )
}
