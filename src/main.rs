mod app;
mod color;
mod config;
mod data;
mod export;
mod render;
mod state;
mod ui;

use app::MtpViewerApp;
use clap::Parser;
use config::{Cli, ViewerConfig};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let cli = Cli::parse();
    let config = match ViewerConfig::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e:#}; using default settings");
            ViewerConfig::default()
        }
    };
    log::info!("Starting with {:?} layout", config.layout);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "MTP-5 Temperature Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(MtpViewerApp::new(&config)))),
    )
}
