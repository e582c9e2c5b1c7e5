//! HousePredict - Housing price dashboard
//!
//! Explore the Ames housing dataset and estimate sale prices with a gradient boosted tree model.

mod charts;
mod config;
mod data;
mod gui;
mod model;
mod stats;

use config::AppConfig;
use eframe::egui;
use gui::HousePredictApp;
use log::info;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env_or_default();
    info!(
        "Starting HousePredict (data: {}, model: {})",
        config.data.train_path.display(),
        config.model.pinned_path.display()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("HousePredict"),
        ..Default::default()
    };

    eframe::run_native(
        "HousePredict",
        options,
        Box::new(|cc| Ok(Box::new(HousePredictApp::new(cc, config)))),
    )
}
