//! Sidebar
//! Architecture image, branding, page navigation and load status.

use anyhow::Context;
use egui::load::SizedTexture;
use egui::{RichText, TextureHandle};
use log::warn;
use std::path::{Path, PathBuf};

/// Dashboard pages, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Data,
    Visualisation,
    Modelling,
    Documentation,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::Data,
        Page::Visualisation,
        Page::Modelling,
        Page::Documentation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Home => "🏠 Home",
            Page::Data => "📊 Data",
            Page::Visualisation => "📈 Visualisation",
            Page::Modelling => "🤖 Modelling",
            Page::Documentation => "📚 Documentation",
        }
    }
}

enum ImageState {
    Pending,
    Ready(TextureHandle),
    Missing,
}

/// Decode an image file into RGBA pixels for egui.
pub fn load_color_image(path: &Path) -> anyhow::Result<egui::ColorImage> {
    let image = image::open(path)
        .with_context(|| format!("Could not open {}", path.display()))?
        .to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw()))
}

pub struct Sidebar {
    image_path: PathBuf,
    image: ImageState,
}

impl Sidebar {
    pub fn new(image_path: PathBuf) -> Self {
        Self {
            image_path,
            image: ImageState::Pending,
        }
    }

    fn ensure_image(&mut self, ctx: &egui::Context) {
        if !matches!(self.image, ImageState::Pending) {
            return;
        }
        self.image = match load_color_image(&self.image_path) {
            Ok(pixels) => ImageState::Ready(ctx.load_texture(
                "architecture",
                pixels,
                egui::TextureOptions::LINEAR,
            )),
            Err(e) => {
                warn!("{:#}", e);
                ImageState::Missing
            }
        };
    }

    /// Draw the sidebar. Returns true when the page changed.
    pub fn show(&mut self, ui: &mut egui::Ui, page: &mut Page, status: &[(&str, String)]) -> bool {
        self.ensure_image(ui.ctx());

        match &self.image {
            ImageState::Ready(texture) => {
                ui.add(
                    egui::Image::from_texture(SizedTexture::from_handle(texture))
                        .max_width(ui.available_width()),
                );
            }
            ImageState::Missing => {
                let name = self
                    .image_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| self.image_path.display().to_string());
                ui.label(
                    RichText::new(format!("❌ {} not found", name))
                        .color(crate::gui::widgets::ERROR_COLOR),
                );
            }
            ImageState::Pending => {}
        }

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            ui.heading(RichText::new("🏢 HousePredict").strong());
        });
        ui.separator();

        ui.label(RichText::new("Navigation").strong());
        let before = *page;
        for candidate in Page::ALL {
            ui.radio_value(page, candidate, candidate.label());
        }

        ui.add_space(12.0);
        ui.separator();
        ui.label(RichText::new("Status").strong());
        for (label, value) in status {
            ui.horizontal(|ui| {
                ui.label(format!("{}:", label));
                ui.label(RichText::new(value).weak());
            });
        }

        *page != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_have_distinct_labels() {
        let labels: Vec<&str> = Page::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(labels[0], "🏠 Home");
        assert_eq!(labels[4], "📚 Documentation");
        for (i, a) in labels.iter().enumerate() {
            assert!(labels[i + 1..].iter().all(|b| a != b));
        }
    }

    #[test]
    fn decodes_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("architecture.png");
        let pixels = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        pixels.save(&path).unwrap();

        let loaded = load_color_image(&path).unwrap();
        assert_eq!(loaded.size, [3, 2]);
        assert_eq!(loaded.pixels[0], egui::Color32::from_rgb(10, 20, 30));
    }

    #[test]
    fn missing_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_color_image(&dir.path().join("architecture.png")).unwrap_err();
        assert!(format!("{:#}", err).contains("architecture.png"));
    }
}
