//! NZ Vaccine Stats - COVID-19 vaccine uptake dashboard
//!
//! Loads the Ministry of Health uptake table and charts coverage by area,
//! ethnic group, age group and gender.

mod charts;
mod data;
mod export;
mod gui;
mod settings;
mod stats;

use anyhow::anyhow;
use clap::Parser;
use eframe::egui;
use gui::VaccineStatsApp;
use settings::Settings;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();

    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    fmt().with_env_filter(env).init();
    info!(source = %settings.source, "startup");

    if let Some(dir) = settings.export.clone() {
        return export::run(&settings, &dir);
    }

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1300.0, 850.0])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("NZ COVID-19 Vaccine Stats"),
        ..Default::default()
    };

    eframe::run_native(
        "NZ COVID-19 Vaccine Stats",
        options,
        Box::new(move |cc| Ok(Box::new(VaccineStatsApp::new(cc, settings)))),
    )
    .map_err(|e| anyhow!("dashboard exited with error: {e}"))
}
