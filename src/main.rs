//! Timebar - Zoomable time-series bar chart
//!
//! Usage: `timebar [config.json]`

use anyhow::Context;
use eframe::egui;
use std::path::PathBuf;
use timebar::config::ChartConfig;
use timebar::gui::TimebarApp;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = ChartConfig::load_or_default(config_path.as_deref())
        .context("Failed to load chart configuration")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 720.0])
            .with_min_inner_size([800.0, 520.0])
            .with_title("Timebar"),
        ..Default::default()
    };

    eframe::run_native(
        "Timebar",
        options,
        Box::new(move |cc| Ok(Box::new(TimebarApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
