//! Home Page
//! Welcome banner, feature overview, data architecture and dataset quick facts.

use crate::data::HousingData;
use crate::gui::widgets::{self, dollars};
use crate::model::features::group_thousands;
use egui::RichText;

struct Feature {
    icon: &'static str,
    title: &'static str,
    description: &'static str,
    details: &'static [&'static str],
}

const FEATURES: [Feature; 4] = [
    Feature {
        icon: "🔍",
        title: "Data Exploration",
        description: "Browse the housing records, filter by price and inspect every column \
                      with descriptive statistics and data quality checks.",
        details: &[
            "Interactive table with column and price filters",
            "Numeric and categorical summaries",
            "Missing value report",
            "CSV and Excel exports",
        ],
    },
    Feature {
        icon: "📊",
        title: "Visual Analytics",
        description: "Study the sale price and its drivers through distributions, \
                      correlations and group comparisons.",
        details: &[
            "Target distribution, box plot and QQ plot",
            "Correlation heatmap and top correlations",
            "Bivariate relations with trend line",
            "Categorical, multivariate and temporal views",
        ],
    },
    Feature {
        icon: "🤖",
        title: "Price Prediction",
        description: "Estimate a sale price from twelve property characteristics with a \
                      gradient boosted tree model trained on the same data.",
        details: &[
            "XGBoost model loaded at startup",
            "Form with validated input ranges",
            "Estimate on the log scale and in dollars",
            "Downloadable estimate report",
        ],
    },
    Feature {
        icon: "📚",
        title: "Documentation",
        description: "Step by step guide to every page, with best practices and \
                      troubleshooting tips.",
        details: &[
            "Page by page walkthrough",
            "Interpretation hints",
            "Common problems and fixes",
        ],
    },
];

const ARCHITECTURE_STEPS: [(&str, &str); 4] = [
    ("📥 Ingestion", "train.csv and test.csv are read and merged, the Id column is dropped."),
    ("🧹 Preparation", "Text columns are normalized, numeric columns keep their missing values."),
    ("📈 Analysis", "Summaries are computed on demand and cached per page."),
    ("🤖 Prediction", "The booster is loaded once and shared with the modelling page."),
];

pub fn show(ui: &mut egui::Ui, data: Option<&HousingData>) {
    widgets::page_header(ui, "🏠 HOUSEPREDICT", Some("Housing Price Prediction Dashboard"));

    widgets::card(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(
            RichText::new("Welcome to the housing price prediction platform")
                .size(18.0)
                .strong(),
        );
        ui.add_space(4.0);
        ui.label(
            "HousePredict brings data exploration, statistical analysis and a machine \
             learning model together in one place. Explore the Ames housing records, \
             understand what drives the sale price and get an instant estimate for a \
             property of your own.",
        );
    });

    widgets::section(ui, "✨ Features");
    for pair in FEATURES.chunks(2) {
        ui.columns(2, |cols| {
            for (col, feature) in cols.iter_mut().zip(pair.iter()) {
                feature_card(col, feature);
            }
        });
        ui.add_space(8.0);
    }

    widgets::section(ui, "🏗 Data Architecture");
    ui.columns(ARCHITECTURE_STEPS.len(), |cols| {
        for (col, (title, text)) in cols.iter_mut().zip(ARCHITECTURE_STEPS.iter()) {
            widgets::card(col, |ui| {
                ui.set_min_height(90.0);
                ui.label(RichText::new(*title).strong());
                ui.label(*text);
            });
        }
    });

    widgets::section(ui, "📌 Dataset Quick Facts");
    match data {
        Some(data) => quick_facts(ui, data),
        None => widgets::info_box(ui, "The dataset is not loaded yet."),
    }
}

fn feature_card(ui: &mut egui::Ui, feature: &Feature) {
    widgets::card(ui, |ui| {
        ui.set_min_height(180.0);
        ui.set_width(ui.available_width());
        ui.label(RichText::new(format!("{} {}", feature.icon, feature.title)).size(17.0).strong());
        ui.add_space(4.0);
        ui.label(feature.description);
        ui.add_space(4.0);
        for detail in feature.details {
            ui.label(format!("• {}", detail));
        }
    });
}

fn quick_facts(ui: &mut egui::Ui, data: &HousingData) {
    let prices = data.present_values(data.target());
    let mean = crate::stats::StatsCalculator::mean(&prices);
    widgets::metric_row(
        ui,
        &[
            ("🏠 Houses", group_thousands(data.row_count() as f64)),
            ("🔢 Variables", data.column_count().to_string()),
            ("💰 Priced sales", group_thousands(prices.len() as f64)),
            ("📊 Average price", dollars(mean)),
        ],
    );
}
