//! Shared page widgets: headers, cards, metrics, notices and the save flow.

use crate::data::export::write_file;
use anyhow::Context;
use egui::{Color32, ComboBox, RichText};
use log::warn;
use std::path::PathBuf;

pub const HEADER_COLOR: Color32 = Color32::from_rgb(30, 58, 138);
pub const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);
pub const WARNING_COLOR: Color32 = Color32::from_rgb(243, 156, 18);
pub const SUCCESS_COLOR: Color32 = Color32::from_rgb(46, 204, 113);

/// Page title banner with an optional subtitle.
pub fn page_header(ui: &mut egui::Ui, title: &str, subtitle: Option<&str>) {
    egui::Frame::none()
        .fill(HEADER_COLOR)
        .rounding(12.0)
        .inner_margin(16.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(title).size(26.0).strong().color(Color32::WHITE));
                if let Some(subtitle) = subtitle {
                    ui.label(RichText::new(subtitle).size(13.0).color(Color32::LIGHT_GRAY));
                }
            });
        });
    ui.add_space(10.0);
}

/// Section heading.
pub fn section(ui: &mut egui::Ui, title: &str) {
    ui.add_space(12.0);
    ui.label(RichText::new(title).size(18.0).strong());
    ui.add_space(4.0);
}

/// Rounded card around `add_contents`.
pub fn card<R>(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> R {
    egui::Frame::none()
        .fill(ui.visuals().widgets.noninteractive.bg_fill)
        .rounding(8.0)
        .inner_margin(12.0)
        .show(ui, add_contents)
        .inner
}

/// Label over a large value.
pub fn metric(ui: &mut egui::Ui, label: &str, value: &str) {
    card(ui, |ui| {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(label).size(12.0).color(Color32::GRAY));
            ui.label(RichText::new(value).size(22.0).strong());
        });
    });
}

/// Row of equally wide metrics.
pub fn metric_row(ui: &mut egui::Ui, metrics: &[(&str, String)]) {
    ui.columns(metrics.len().max(1), |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(metrics.iter()) {
            metric(col, label, value);
        }
    });
}

pub fn error_box(ui: &mut egui::Ui, message: &str) {
    ui.label(RichText::new(format!("❌ {}", message)).color(ERROR_COLOR));
}

pub fn warning_box(ui: &mut egui::Ui, message: &str) {
    ui.label(RichText::new(format!("⚠ {}", message)).color(WARNING_COLOR));
}

pub fn success_box(ui: &mut egui::Ui, message: &str) {
    ui.label(RichText::new(format!("✅ {}", message)).color(SUCCESS_COLOR));
}

pub fn info_box(ui: &mut egui::Ui, message: &str) {
    ui.label(RichText::new(format!("ℹ {}", message)).color(Color32::from_rgb(52, 152, 219)));
}

/// Keep `choice` if it is still offered, otherwise fall back to the first option.
pub fn pick<'a>(choice: &mut Option<String>, options: &'a [String]) -> Option<&'a String> {
    let current = choice
        .as_ref()
        .and_then(|c| options.iter().find(|o| *o == c))
        .or_else(|| options.first());
    *choice = current.cloned();
    current
}

/// Labeled combo box bound to `choice`. Returns the selection, `None` without options.
pub fn select(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    choice: &mut Option<String>,
    options: &[String],
) -> Option<String> {
    let current = pick(choice, options)?.clone();
    let mut selected = current.clone();
    ui.horizontal(|ui| {
        if !label.is_empty() {
            ui.label(label);
        }
        ComboBox::from_id_salt(id)
            .width(200.0)
            .selected_text(selected.as_str())
            .show_ui(ui, |ui| {
                for option in options {
                    ui.selectable_value(&mut selected, option.clone(), option.as_str());
                }
            });
    });
    if selected != current {
        *choice = Some(selected.clone());
    }
    Some(selected)
}

/// Outcome of the last user action on a page.
#[derive(Debug, Clone)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn show(&self, ui: &mut egui::Ui) {
        match self {
            Notice::Success(msg) => success_box(ui, msg),
            Notice::Error(msg) => error_box(ui, msg),
        }
    }

    /// Notice for the result of [`save_bytes`].
    pub fn from_save(result: anyhow::Result<Option<PathBuf>>) -> Option<Self> {
        match result {
            Ok(Some(path)) => Some(Notice::Success(format!("Saved {}", path.display()))),
            Ok(None) => None,
            Err(e) => Some(Notice::Error(format!("{:#}", e))),
        }
    }
}

/// Ask for a destination and write `bytes` there. `Ok(None)` when the dialog is cancelled.
pub fn save_bytes(
    bytes: &[u8],
    default_name: &str,
    filter_name: &str,
    extension: &str,
    open_after: bool,
) -> anyhow::Result<Option<PathBuf>> {
    let Some(path) = rfd::FileDialog::new()
        .add_filter(filter_name, &[extension])
        .set_file_name(default_name)
        .save_file()
    else {
        return Ok(None);
    };

    write_file(&path, bytes).with_context(|| format!("Could not save {}", path.display()))?;

    if open_after {
        if let Err(e) = open::that(&path) {
            warn!("Could not open {}: {}", path.display(), e);
        }
    }
    Ok(Some(path))
}

/// Dollar amount with thousands separators.
pub fn dollars(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("${}", crate::model::features::group_thousands(value))
    }
}

/// Fixed-precision number, `-` for NaN.
pub fn number(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{:.*}", decimals, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_money_and_numbers() {
        assert_eq!(dollars(180921.4), "$180,921");
        assert_eq!(dollars(f64::NAN), "-");
        assert_eq!(number(1.23456, 2), "1.23");
        assert_eq!(number(f64::NAN, 2), "-");
    }

    #[test]
    fn pick_falls_back_to_first_option() {
        let options = vec!["A".to_string(), "B".to_string()];
        let mut choice = Some("Z".to_string());
        assert_eq!(pick(&mut choice, &options), Some(&options[0]));
        assert_eq!(choice.as_deref(), Some("A"));

        let mut choice = Some("B".to_string());
        assert_eq!(pick(&mut choice, &options), Some(&options[1]));

        let mut choice = None;
        assert_eq!(pick(&mut choice, &[]), None);
        assert!(choice.is_none());
    }

    #[test]
    fn cancelled_save_has_no_notice() {
        assert!(Notice::from_save(Ok(None)).is_none());
        assert!(matches!(
            Notice::from_save(Err(anyhow::anyhow!("disk full"))),
            Some(Notice::Error(msg)) if msg == "disk full"
        ));
    }
}
