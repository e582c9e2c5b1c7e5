//! Documentation Page
//! Static user guide, one section at a time.

use crate::gui::widgets;
use egui::RichText;

enum Block {
    Heading(&'static str),
    Text(&'static str),
    Bullets(&'static [&'static str]),
    Tip(&'static str),
}

struct Section {
    title: &'static str,
    blocks: &'static [Block],
}

const SECTIONS: [Section; 7] = [
    Section {
        title: "🎯 Introduction",
        blocks: &[
            Block::Heading("What is HousePredict?"),
            Block::Text(
                "HousePredict is a desktop dashboard for residential sale prices. It combines \
                 exploratory analysis of the Ames housing dataset with an XGBoost model that \
                 estimates the price of a property from twelve characteristics.",
            ),
            Block::Bullets(&[
                "Exploration: understand the structure and quality of the data",
                "Analysis: find the variables that drive the sale price",
                "Prediction: estimate a price for a new property",
                "Visualisation: interactive charts on every page",
            ]),
            Block::Heading("Who is it for?"),
            Block::Bullets(&[
                "Real estate agents estimating properties",
                "Data analysts studying the housing market",
                "Students learning applied machine learning",
                "Investors looking for opportunities",
            ]),
        ],
    },
    Section {
        title: "🏠 Home page",
        blocks: &[
            Block::Text(
                "The home page introduces the application, lists what each page offers and \
                 shows a few quick facts about the loaded dataset.",
            ),
            Block::Tip("Use the navigation on the left to move between pages at any time."),
        ],
    },
    Section {
        title: "📊 Data page",
        blocks: &[
            Block::Heading("Purpose"),
            Block::Text("Get to know the dataset before analysing or modelling it."),
            Block::Heading("Step by step"),
            Block::Bullets(&[
                "Read the overview metrics: size of the dataset and price range",
                "Pick the columns and the number of rows shown in the table",
                "Narrow the price range to focus on a market segment",
                "Check the numeric and categorical statistics",
                "Review the missing values before drawing conclusions",
                "Export the full or filtered data as CSV, or the statistics as Excel",
            ]),
            Block::Tip("SalePrice is always kept in the table: it is the variable everything else is compared to."),
        ],
    },
    Section {
        title: "📈 Analysis page",
        blocks: &[
            Block::Heading("Available views"),
            Block::Bullets(&[
                "Target: distribution, outliers, normality and transformations of the sale price",
                "Correlation: matrix of linear correlations and the strongest links with the price",
                "Relations: scatter plot of two variables with a least squares trend line",
                "Categorical: price by category as box plots, mean bars or frequencies",
                "Multivariate: scatter plot with size and color encodings",
                "Temporal: price and sales volume by year or month",
            ]),
            Block::Heading("Reading the correlation matrix"),
            Block::Bullets(&[
                "Red: strong positive correlation",
                "Blue: strong negative correlation",
                "White: no linear correlation",
                "Values range from -1 to +1",
            ]),
            Block::Heading("Reading box plots"),
            Block::Bullets(&[
                "Median: central price of the group",
                "Box: the middle 50% of the data (Q1 to Q3)",
                "Whiskers: normal spread of the data",
                "Points: extreme values (outliers)",
            ]),
        ],
    },
    Section {
        title: "🤖 Modelling page",
        blocks: &[
            Block::Heading("The model"),
            Block::Text(
                "Prices are estimated by a gradient boosted tree ensemble (XGBoost) trained on \
                 the logarithm of the sale price. The page converts the model output back to \
                 dollars.",
            ),
            Block::Heading("Making an estimate"),
            Block::Bullets(&[
                "Fill in the twelve characteristics, grouped by lot, house, garage and sale",
                "Press the estimate button",
                "Read the estimated price and the summary of the inputs",
                "Download the estimate as CSV if needed",
            ]),
            Block::Tip("Stay within the input ranges: the model was not trained on values outside them."),
        ],
    },
    Section {
        title: "🚀 Best practices",
        blocks: &[
            Block::Heading("Recommended workflow"),
            Block::Bullets(&[
                "1. Exploration: understand the structure of the data on the Data page",
                "2. Analysis: identify patterns and relations on the Analysis page",
                "3. Modelling: use the predictions on the Modelling page",
            ]),
            Block::Heading("Tips"),
            Block::Bullets(&[
                "Start with the variables most correlated with the price",
                "Use the filters to isolate specific market segments",
                "Check the outliers, they can bias the analysis",
                "Compare several chart types for the same variable",
            ]),
            Block::Heading("Pitfalls"),
            Block::Bullets(&[
                "Do not over-interpret weak correlations",
                "Do not use the model outside its training ranges",
                "Do not base decisions on model estimates alone",
            ]),
        ],
    },
    Section {
        title: "🔧 Troubleshooting",
        blocks: &[
            Block::Heading("The dataset does not load"),
            Block::Text(
                "Check that train.csv and test.csv exist at the configured paths and use the \
                 configured delimiter. The error is shown in the sidebar status and in the log.",
            ),
            Block::Heading("The model is unavailable"),
            Block::Text(
                "Place an XGBoost JSON model at model.pinned_path or in model.search_dir. Both the \
                 native model format and the JSON tree dump are accepted.",
            ),
            Block::Heading("Reporting a problem"),
            Block::Bullets(&[
                "The full error message",
                "The steps to reproduce it",
                "The log output with RUST_LOG=debug",
            ]),
        ],
    },
];

/// Documentation page state: the selected section.
#[derive(Default)]
pub struct GuidePage {
    selected: usize,
}

impl GuidePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        widgets::page_header(
            ui,
            "📚 User Guide",
            Some("Everything you need to get the most out of HousePredict"),
        );

        ui.horizontal_wrapped(|ui| {
            for (i, section) in SECTIONS.iter().enumerate() {
                ui.selectable_value(&mut self.selected, i, section.title);
            }
        });
        ui.separator();

        let section = &SECTIONS[self.selected.min(SECTIONS.len() - 1)];
        widgets::section(ui, section.title);
        for block in section.blocks {
            match block {
                Block::Heading(text) => {
                    ui.add_space(6.0);
                    ui.label(RichText::new(*text).size(16.0).strong());
                }
                Block::Text(text) => {
                    ui.label(*text);
                }
                Block::Bullets(items) => {
                    for item in items.iter() {
                        ui.label(format!("• {}", item));
                    }
                }
                Block::Tip(text) => {
                    ui.add_space(4.0);
                    widgets::card(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new(format!("💡 {}", text)).italics());
                    });
                }
            }
        }

        ui.add_space(16.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("🎉 Thank you for using HousePredict!").strong());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_section_has_content() {
        for section in SECTIONS.iter() {
            assert!(!section.blocks.is_empty(), "{}", section.title);
        }
        assert!(SECTIONS[4].title.contains("Modelling"));
    }
}
