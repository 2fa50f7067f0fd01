// On Windows, don't open a console window behind the app in release builds.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod bridge;

use app::PanelApp;
use bridge::spawn_backend_task;
use panel_core::{prefs::PreferenceStore, PanelConfig};
use tracing::warn;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "fay_panel=debug,panel_core=debug,reqwest=warn".into()),
        )
        .init();

    let config = PanelConfig::from_env();
    let store = match &config.prefs_path {
        Some(path) => Some(PreferenceStore::new(path)),
        None => PreferenceStore::default_location()
            .map_err(|e| warn!("preferences will not be saved: {e}"))
            .ok(),
    };

    let (event_tx, event_rx) = std::sync::mpsc::channel();
    let (cmd_tx, cmd_rx) = tokio::sync::mpsc::unbounded_channel();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([720.0, 480.0])
            .with_title("Fay Panel"),
        ..Default::default()
    };

    eframe::run_native(
        "Fay Panel",
        options,
        Box::new(move |cc| {
            spawn_backend_task(config, event_tx, cmd_rx, cc.egui_ctx.clone());
            Ok(Box::new(PanelApp::new(cc, event_rx, cmd_tx, store)))
        }),
    )
}
