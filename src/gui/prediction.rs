//! Prediction Page
//! Input form over the twelve model features, estimate card and report download.

use crate::data::export::{table_to_csv_bytes, ESTIMATE_CSV_NAME};
use crate::gui::widgets::{self, Notice};
use crate::model::features::{FeatureSpec, InputKind};
use crate::model::{FeatureVector, PredictionResult, Predictor, FEATURE_SPECS};
use anyhow::Context;
use egui::{Color32, DragValue, RichText, Slider};
use log::{error, info};

/// Form sections, as indices into [`FEATURE_SPECS`].
const GROUPS: [(&str, &[usize]); 4] = [
    ("📏 Lot", &[0, 1, 2]),
    ("🏠 House", &[3, 5, 6, 7]),
    ("🚗 Garage", &[8, 9, 10]),
    ("📅 Additional", &[4, 11]),
];

const RESULT_COLOR: Color32 = Color32::from_rgb(102, 126, 234);

/// Prediction page state.
#[derive(Default)]
pub struct PredictionPage {
    inputs: FeatureVector,
    result: Option<PredictionResult>,
    error: Option<String>,
    notice: Option<Notice>,
}

impl PredictionPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, ui: &mut egui::Ui, predictor: &Predictor) {
        header(ui);

        widgets::section(ui, "📝 Property characteristics");
        ui.columns(2, |cols| {
            for (i, (title, indices)) in GROUPS.iter().enumerate() {
                let ui = &mut cols[i / 2];
                widgets::card(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(RichText::new(*title).strong());
                    egui::Grid::new(format!("feature_group_{}", i))
                        .num_columns(2)
                        .spacing([12.0, 6.0])
                        .show(ui, |ui| {
                            for &index in indices.iter() {
                                input_row(ui, &mut self.inputs, index);
                                ui.end_row();
                            }
                        });
                });
                ui.add_space(8.0);
            }
        });

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("🔮 Estimate the price").size(18.0))
                .min_size(egui::vec2(260.0, 40.0));
            if ui.add(button).clicked() {
                self.run(predictor);
            }
        });

        if let Some(message) = &self.error {
            ui.add_space(8.0);
            widgets::error_box(ui, &format!("Prediction failed: {}", message));
            widgets::info_box(ui, "Check that all values are filled in correctly.");
        }

        if let Some(result) = &self.result {
            let export = show_result(ui, result);
            if export {
                self.notice = Notice::from_save(save_report(result));
            }
        }

        if let Some(notice) = &self.notice {
            notice.show(ui);
        }

        model_info(ui, predictor);
    }

    /// Page body when no model could be loaded: the message and no form.
    pub fn show_unavailable(ui: &mut egui::Ui, message: &str) {
        header(ui);
        widgets::error_box(ui, &format!("Model unavailable: {}", message));
        widgets::info_box(
            ui,
            "Place an XGBoost JSON model next to the application or set model.pinned_path in the config.",
        );
    }

    fn run(&mut self, predictor: &Predictor) {
        self.notice = None;
        match predictor.predict(&self.inputs) {
            Ok(result) => {
                info!("Estimated price {}", result.price_label());
                self.result = Some(result);
                self.error = None;
            }
            Err(e) => {
                error!("Prediction failed: {}", e);
                self.result = None;
                self.error = Some(e.to_string());
            }
        }
    }
}

fn header(ui: &mut egui::Ui) {
    widgets::page_header(
        ui,
        "🤖 Price Prediction",
        Some("Estimate a sale price from the main property characteristics"),
    );
}

fn input_row(ui: &mut egui::Ui, inputs: &mut FeatureVector, index: usize) {
    let spec: &FeatureSpec = &FEATURE_SPECS[index];
    ui.label(spec.label).on_hover_text(spec.help);
    let Some(value) = inputs.value_mut(index) else {
        return;
    };
    let response = match spec.kind {
        InputKind::Slider => ui.add(
            Slider::new(value, spec.min..=spec.max)
                .step_by(spec.step)
                .fixed_decimals(0),
        ),
        InputKind::Number => ui.add(
            DragValue::new(value)
                .range(spec.min..=spec.max)
                .speed(spec.step)
                .fixed_decimals(0),
        ),
    };
    response.on_hover_text(spec.help);
}

/// Estimate card, input summary and download button. Returns true when a download was requested.
fn show_result(ui: &mut egui::Ui, result: &PredictionResult) -> bool {
    ui.add_space(12.0);
    egui::Frame::none()
        .fill(RESULT_COLOR)
        .rounding(15.0)
        .inner_margin(20.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("ESTIMATED PRICE").size(16.0).color(Color32::WHITE));
                ui.label(
                    RichText::new(result.price_label())
                        .size(40.0)
                        .strong()
                        .color(Color32::WHITE),
                );
                ui.label(
                    RichText::new(format!("log(1 + price) = {:.4}", result.log_price))
                        .size(12.0)
                        .color(Color32::LIGHT_GRAY),
                );
            });
        });

    widgets::section(ui, "📋 Input summary");
    let rows = result.inputs.summary_rows();
    for chunk in rows.chunks(3) {
        let metrics: Vec<(&str, String)> = chunk
            .iter()
            .map(|(label, value)| (label.as_str(), value.clone()))
            .collect();
        widgets::metric_row(ui, &metrics);
        ui.add_space(6.0);
    }

    ui.add_space(6.0);
    ui.button("📥 Download the estimate (CSV)").clicked()
}

fn save_report(result: &PredictionResult) -> anyhow::Result<Option<std::path::PathBuf>> {
    let bytes = estimate_csv(result)?;
    widgets::save_bytes(&bytes, ESTIMATE_CSV_NAME, "CSV", "csv", false)
}

/// Two-column report of the inputs and the estimate.
pub fn estimate_csv(result: &PredictionResult) -> anyhow::Result<Vec<u8>> {
    table_to_csv_bytes(["Characteristic", "Value"], &result.report_rows())
        .context("Could not build the estimate report")
}

fn model_info(ui: &mut egui::Ui, predictor: &Predictor) {
    ui.add_space(16.0);
    widgets::card(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new("ℹ About this model").strong());
        ui.label(
            "Estimates come from an XGBoost gradient boosted tree ensemble trained on the \
             log of the sale price. They are indicative only and do not replace a \
             professional valuation.",
        );
        let booster = predictor.booster();
        let source = booster
            .source()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "memory".to_string());
        ui.label(
            RichText::new(format!(
                "{} with {} trees and base score {:.4}, loaded from {}",
                booster.format(),
                booster.tree_count(),
                booster.base_score(),
                source
            ))
            .weak(),
        );
        let binding = match booster.feature_names() {
            Some(names) => format!("Inputs matched by name ({} features)", names.len()),
            None => "Inputs matched by position".to_string(),
        };
        ui.label(RichText::new(binding).weak());
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::booster::tests::NATIVE_MODEL;
    use crate::model::booster::Booster;
    use std::sync::Arc;

    fn predictor() -> Predictor {
        Predictor::new(Arc::new(Booster::from_json_str(NATIVE_MODEL, 0.5).unwrap()))
    }

    #[test]
    fn groups_cover_every_feature_once() {
        let mut seen: Vec<usize> = GROUPS.iter().flat_map(|(_, idx)| idx.iter().copied()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..FEATURE_SPECS.len()).collect::<Vec<_>>());
    }

    #[test]
    fn run_stores_result_and_clears_error() {
        let mut page = PredictionPage::new();
        page.error = Some("stale".into());
        page.run(&predictor());
        assert!(page.error.is_none());
        let result = page.result.as_ref().unwrap();
        assert!((result.log_price - 11.15).abs() < 1e-9);
    }

    #[test]
    fn estimate_csv_has_header_and_twelve_rows() {
        let result = predictor().predict(&FeatureVector::default()).unwrap();
        let text = String::from_utf8(estimate_csv(&result).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Characteristic,Value");
        assert_eq!(lines.len(), 13);
        assert!(lines[11].starts_with("Estimated price (log),11.1500"));
    }
}
