//! HousePredict Main Application
//! Sidebar navigation, background loading of the dataset and model, page routing.

use crate::config::AppConfig;
use crate::data::{DatasetLoader, HousingData};
use crate::gui::analysis::AnalysisPage;
use crate::gui::explorer::ExplorerPage;
use crate::gui::guide::GuidePage;
use crate::gui::prediction::PredictionPage;
use crate::gui::sidebar::{Page, Sidebar};
use crate::gui::{home, widgets};
use crate::model::{load_model, Predictor};
use anyhow::Context;
use egui::SidePanel;
use log::{error, info};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;

/// Progress of a resource loaded on a background thread.
pub enum LoadState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    fn status(&self, ready: impl FnOnce(&T) -> String) -> String {
        match self {
            LoadState::Loading => "loading...".to_string(),
            LoadState::Ready(value) => ready(value),
            LoadState::Failed(_) => "unavailable".to_string(),
        }
    }
}

/// One-shot background job, polled each frame.
struct Pending<T> {
    rx: Receiver<Result<T, String>>,
}

impl<T: Send + 'static> Pending<T> {
    fn spawn(job: impl FnOnce() -> anyhow::Result<T> + Send + 'static) -> Self {
        let (tx, rx) = channel();
        thread::spawn(move || {
            let result = job().map_err(|e| format!("{:#}", e));
            let _ = tx.send(result);
        });
        Self { rx }
    }

    /// `Some` once the job has finished. A vanished worker counts as a failure.
    fn poll(&self) -> Option<Result<T, String>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(std::sync::mpsc::TryRecvError::Empty) => None,
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                Some(Err("background loader stopped unexpectedly".to_string()))
            }
        }
    }
}

/// Main application window.
pub struct HousePredictApp {
    page: Page,
    sidebar: Sidebar,

    dataset: LoadState<Arc<HousingData>>,
    model: LoadState<Predictor>,
    dataset_rx: Option<Pending<HousingData>>,
    model_rx: Option<Pending<Predictor>>,

    explorer: ExplorerPage,
    analysis: AnalysisPage,
    prediction: PredictionPage,
    guide: GuidePage,
}

impl HousePredictApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let data_config = config.clone();
        let dataset_rx = Pending::spawn(move || {
            DatasetLoader::new(&data_config)
                .load()
                .with_context(|| {
                    format!(
                        "Could not load {} and {}",
                        data_config.data.train_path.display(),
                        data_config.data.test_path.display()
                    )
                })
        });

        let model_config = config.model.clone();
        let model_rx = Pending::spawn(move || {
            let booster = load_model(&model_config).context("Could not load the price model")?;
            Ok(Predictor::new(Arc::new(booster)))
        });

        Self {
            page: Page::Home,
            sidebar: Sidebar::new(config.assets.architecture_image.clone()),
            dataset: LoadState::Loading,
            model: LoadState::Loading,
            dataset_rx: Some(dataset_rx),
            model_rx: Some(model_rx),
            explorer: ExplorerPage::new(),
            analysis: AnalysisPage::new(),
            prediction: PredictionPage::new(),
            guide: GuidePage::new(),
        }
    }

    /// Check for background load results
    fn check_load_results(&mut self) {
        if let Some(result) = self.dataset_rx.as_ref().and_then(Pending::poll) {
            self.dataset_rx = None;
            self.dataset = match result {
                Ok(data) => {
                    info!(
                        "Dataset ready: {} rows, {} columns",
                        data.row_count(),
                        data.column_count()
                    );
                    LoadState::Ready(Arc::new(data))
                }
                Err(e) => {
                    error!("{}", e);
                    LoadState::Failed(e)
                }
            };
        }

        if let Some(result) = self.model_rx.as_ref().and_then(Pending::poll) {
            self.model_rx = None;
            self.model = match result {
                Ok(predictor) => {
                    info!(
                        "Model ready: {} trees ({})",
                        predictor.booster().tree_count(),
                        predictor.booster().format()
                    );
                    LoadState::Ready(predictor)
                }
                Err(e) => {
                    error!("{}", e);
                    LoadState::Failed(e)
                }
            };
        }
    }

    fn status_lines(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "Dataset",
                self.dataset
                    .status(|d| format!("{} rows, {} columns", d.row_count(), d.column_count())),
            ),
            (
                "Model",
                self.model
                    .status(|p| format!("{} trees", p.booster().tree_count())),
            ),
        ]
    }

    fn show_page(&mut self, ui: &mut egui::Ui) {
        match self.page {
            Page::Home => home::show(ui, self.dataset.ready().map(|d| d.as_ref())),
            Page::Data => match &self.dataset {
                LoadState::Ready(data) => self.explorer.show(ui, data),
                other => dataset_placeholder(ui, other),
            },
            Page::Visualisation => match &self.dataset {
                LoadState::Ready(data) => self.analysis.show(ui, data),
                other => dataset_placeholder(ui, other),
            },
            Page::Modelling => match &self.model {
                LoadState::Ready(predictor) => self.prediction.show(ui, predictor),
                LoadState::Loading => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading the price model...");
                    });
                }
                LoadState::Failed(message) => PredictionPage::show_unavailable(ui, message),
            },
            Page::Documentation => self.guide.show(ui),
        }
    }
}

fn dataset_placeholder(ui: &mut egui::Ui, state: &LoadState<Arc<HousingData>>) {
    match state {
        LoadState::Failed(message) => {
            widgets::page_header(ui, "📊 Data unavailable", None);
            widgets::error_box(ui, message);
            widgets::info_box(
                ui,
                "Check data.train_path and data.test_path in housepredict.toml.",
            );
        }
        _ => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading the housing dataset...");
            });
        }
    }
}

impl eframe::App for HousePredictApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.dataset.is_loading() || self.model.is_loading() {
            ctx.request_repaint();
        }

        let status = self.status_lines();
        SidePanel::left("sidebar")
            .min_width(240.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    if self.sidebar.show(ui, &mut self.page, &status) {
                        info!("Switched to {:?}", self.page);
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.show_page(ui);
                });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wait<T: Send + 'static>(pending: &Pending<T>) -> Result<T, String> {
        for _ in 0..200 {
            if let Some(result) = pending.poll() {
                return result;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("background job did not finish");
    }

    #[test]
    fn pending_delivers_result() {
        let pending = Pending::spawn(|| Ok(42));
        assert_eq!(wait(&pending), Ok(42));
    }

    #[test]
    fn pending_formats_error_chain() {
        let pending: Pending<u8> = Pending::spawn(|| {
            Err(anyhow::anyhow!("disk gone")).context("Could not load")
        });
        assert_eq!(wait(&pending), Err("Could not load: disk gone".to_string()));
    }

    #[test]
    fn load_state_status() {
        let state: LoadState<u32> = LoadState::Ready(3);
        assert_eq!(state.status(|n| format!("{} items", n)), "3 items");
        assert!(LoadState::<u32>::Loading.is_loading());
        assert_eq!(LoadState::<u32>::Failed("x".into()).status(|_| String::new()), "unavailable");
    }
}
