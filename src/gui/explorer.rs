//! Data Explorer Page
//! Overview metrics, interactive table, statistics, data quality, distributions and exports.

use crate::charts::{palette_color, sequential_color, ChartPlotter, PRIMARY};
use crate::data::export::{
    self, Cell, Sheet, FILTERED_CSV_NAME, FULL_CSV_NAME, REPORT_XLSX_NAME,
};
use crate::data::filter::{
    default_selection, filter_by_price, preview_rows, price_bounds, select_columns,
    ColumnSelection, DEFAULT_PREVIEW_ROWS, PRICE_STEP,
};
use crate::data::HousingData;
use crate::gui::widgets::{self, dollars, number, Notice};
use crate::stats::distribution::histogram;
use crate::stats::summary::{
    CategoricalSummary, DtypeShare, MissingValue, NumericSummary, CATEGORICAL_SUMMARY_LIMIT,
};
use crate::stats::{DatasetSummary, Describe, StatsCalculator};
use anyhow::Context;
use egui::{ComboBox, RichText, ScrollArea, Slider};
use polars::prelude::DataFrame;
use std::path::PathBuf;
use std::sync::Arc;

const MAX_PREVIEW_ROWS: usize = 100;
const HISTOGRAM_BINS: usize = 50;
/// Columns offered in each distribution selector.
const DISTRIBUTION_CHOICES: usize = 15;
const TOP_CATEGORIES: usize = 20;
const TOP_MISSING: usize = 10;

#[derive(Debug, Clone, Copy)]
enum ExportKind {
    Full,
    Filtered,
    Report,
}

/// Dataset-wide summaries, computed once per loaded dataset.
struct ExplorerSummary {
    numeric: Vec<NumericSummary>,
    categorical: Vec<CategoricalSummary>,
    dtypes: Vec<DtypeShare>,
    missing: Vec<MissingValue>,
    total_missing: (usize, f64),
    continuous: Vec<String>,
    price: Describe,
    bounds: Option<(f64, f64)>,
}

impl ExplorerSummary {
    fn compute(data: &HousingData) -> Self {
        Self {
            numeric: DatasetSummary::describe_numeric(data),
            categorical: DatasetSummary::categorical_summary(data, CATEGORICAL_SUMMARY_LIMIT),
            dtypes: DatasetSummary::dtype_distribution(data),
            missing: DatasetSummary::missing_values(data),
            total_missing: DatasetSummary::total_missing(data),
            continuous: DatasetSummary::continuous_columns(data),
            price: StatsCalculator::describe(&data.present_values(data.target())),
            bounds: price_bounds(data),
        }
    }
}

/// Filtered subset for the current column selection and price range.
struct FilteredView {
    key: (Vec<String>, f64, f64),
    selection: ColumnSelection,
    frame: Result<DataFrame, String>,
    rows: Vec<Vec<String>>,
}

/// Explorer page state.
pub struct ExplorerPage {
    show_rows: usize,
    requested: Option<Vec<String>>,
    target_reinserted: bool,
    price_range: Option<(f64, f64)>,
    numeric_choice: Option<String>,
    categorical_choice: Option<String>,
    open_after_export: bool,
    summary: Option<ExplorerSummary>,
    filtered: Option<FilteredView>,
    notice: Option<Notice>,
}

impl Default for ExplorerPage {
    fn default() -> Self {
        Self {
            show_rows: DEFAULT_PREVIEW_ROWS,
            requested: None,
            target_reinserted: false,
            price_range: None,
            numeric_choice: None,
            categorical_choice: None,
            open_after_export: false,
            summary: None,
            filtered: None,
            notice: None,
        }
    }
}

impl ExplorerPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, ui: &mut egui::Ui, data: &Arc<HousingData>) {
        if self.summary.is_none() {
            self.summary = Some(ExplorerSummary::compute(data));
        }

        widgets::page_header(
            ui,
            "📊 Data Exploration",
            Some("Browse, filter and export the housing dataset"),
        );

        self.show_overview(ui, data);
        self.show_table(ui, data);
        self.show_statistics(ui);
        self.show_quality(ui);
        self.show_distributions(ui, data);
        self.show_exports(ui, data);
        self.show_footer(ui, data);
    }

    fn show_overview(&self, ui: &mut egui::Ui, data: &HousingData) {
        let Some(summary) = &self.summary else {
            return;
        };
        widgets::section(ui, "📌 Overview");
        widgets::metric_row(
            ui,
            &[
                ("🏠 Observations", format!("{}", data.row_count())),
                ("🔢 Variables", format!("{}", data.column_count())),
                ("🔢 Numeric variables", format!("{}", data.numeric_columns().len())),
                ("🏷 Categorical variables", format!("{}", data.categorical_columns().len())),
            ],
        );
        ui.add_space(6.0);
        widgets::metric_row(
            ui,
            &[
                ("💰 Average price", dollars(summary.price.mean)),
                ("📊 Median price", dollars(summary.price.median)),
                ("📉 Minimum price", dollars(summary.price.min)),
                ("📈 Maximum price", dollars(summary.price.max)),
            ],
        );
    }

    fn show_table(&mut self, ui: &mut egui::Ui, data: &HousingData) {
        widgets::section(ui, "📋 Interactive Exploration");
        let all = data.column_names();
        let target = data.target().to_string();
        let requested = self
            .requested
            .get_or_insert_with(|| default_selection(&all, &target));
        let mut columns_changed = false;

        ui.horizontal_wrapped(|ui| {
            ui.label("Rows to display:");
            ui.add(
                Slider::new(&mut self.show_rows, 5..=MAX_PREVIEW_ROWS).step_by(5.0),
            );
            ui.add_space(16.0);

            ui.label("Columns:");
            ComboBox::from_id_salt("explorer_columns")
                .width(220.0)
                .selected_text(format!("{} selected", requested.len()))
                .show_ui(ui, |ui| {
                    ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                        for col in &all {
                            let mut on = requested.contains(col);
                            if ui.checkbox(&mut on, col.as_str()).changed() {
                                columns_changed = true;
                                if on {
                                    requested.push(col.clone());
                                } else {
                                    requested.retain(|c| c != col);
                                }
                            }
                        }
                    });
                });
        });

        let Some(summary) = &self.summary else {
            return;
        };
        let Some((lo, hi)) = summary.bounds else {
            widgets::warning_box(ui, "No sale prices available to filter on.");
            return;
        };
        let (min, max) = self.price_range.get_or_insert((lo, hi));
        ui.horizontal(|ui| {
            ui.label("Price range:");
            ui.add(Slider::new(min, lo..=hi).step_by(PRICE_STEP).prefix("$"));
            ui.label("to");
            ui.add(Slider::new(max, lo..=hi).step_by(PRICE_STEP).prefix("$"));
        });
        if *min > *max {
            std::mem::swap(min, max);
        }
        let (min, max) = (*min, *max);

        let selection = select_columns(requested, &all, &target);
        if columns_changed {
            self.target_reinserted = selection.target_reinserted;
        }
        if selection.target_reinserted {
            *requested = selection.columns.clone();
        }
        if self.target_reinserted {
            widgets::error_box(
                ui,
                &format!("'{}' must be selected for the analysis; it was added back.", target),
            );
        }

        let key = (selection.columns.clone(), min, max);
        if self.filtered.as_ref().map(|f| &f.key) != Some(&key) {
            self.filtered = Some(build_filtered_view(data, key, selection));
        }

        let Some(view) = &self.filtered else {
            return;
        };
        match &view.frame {
            Ok(frame) => {
                let headers: Vec<&str> = view.selection.columns.iter().map(String::as_str).collect();
                let shown = self.show_rows.min(view.rows.len());
                ScrollArea::vertical()
                    .id_salt("explorer_table")
                    .max_height(400.0)
                    .show(ui, |ui| {
                        ChartPlotter::draw_table(ui, "explorer_preview", &headers, &view.rows[..shown]);
                    });
                widgets::info_box(
                    ui,
                    &format!(
                        "{} houses shown out of {} | Price: {} - {}",
                        frame.height(),
                        data.row_count(),
                        dollars(min),
                        dollars(max)
                    ),
                );
            }
            Err(e) => widgets::error_box(ui, &format!("Filtering failed: {}", e)),
        }
    }

    fn show_statistics(&self, ui: &mut egui::Ui) {
        let Some(summary) = &self.summary else {
            return;
        };
        widgets::section(ui, "📈 Statistical Analysis");

        ui.columns(2, |cols| {
            cols[0].label(RichText::new("📊 Numeric statistics").strong());
            let rows: Vec<Vec<String>> = summary.numeric.iter().map(describe_row).collect();
            ScrollArea::vertical()
                .id_salt("numeric_stats")
                .max_height(360.0)
                .show(&mut cols[0], |ui| {
                    ChartPlotter::draw_table(ui, "numeric_stats_table", &DESCRIBE_HEADERS, &rows);
                });

            cols[1].label(RichText::new("🏷 Categorical statistics").strong());
            let rows: Vec<Vec<String>> = summary
                .categorical
                .iter()
                .map(|c| {
                    vec![
                        c.column.clone(),
                        c.categories.to_string(),
                        c.mode.clone(),
                        c.mode_count.to_string(),
                        format!("{:.1}%", c.mode_share),
                    ]
                })
                .collect();
            ChartPlotter::draw_table(
                &mut cols[1],
                "categorical_stats_table",
                &["Variable", "Categories", "Mode", "Mode freq.", "Mode %"],
                &rows,
            );
        });
    }

    fn show_quality(&self, ui: &mut egui::Ui) {
        let Some(summary) = &self.summary else {
            return;
        };
        widgets::section(ui, "🔧 Structure and Data Quality");

        ui.columns(2, |cols| {
            cols[0].label(RichText::new("📊 Variable types").strong());
            let labels: Vec<String> = summary
                .dtypes
                .iter()
                .map(|d| format!("{} ({:.1}%)", d.label, d.percent))
                .collect();
            let counts: Vec<f64> = summary.dtypes.iter().map(|d| d.count as f64).collect();
            let colors: Vec<_> = (0..labels.len()).map(palette_color).collect();
            ChartPlotter::draw_horizontal_bars(
                &mut cols[0],
                "dtype_distribution",
                &labels,
                &counts,
                Some(&colors),
                "Columns",
            );

            cols[1].label(RichText::new("⚠ Missing values").strong());
            let top: Vec<&MissingValue> = summary
                .missing
                .iter()
                .filter(|m| m.count > 0)
                .take(TOP_MISSING)
                .collect();
            if top.is_empty() {
                widgets::success_box(&mut cols[1], "No missing values in the dataset!");
            } else {
                let labels: Vec<String> = top
                    .iter()
                    .map(|m| format!("{} ({:.2}%)", m.column, m.percent))
                    .collect();
                let percents: Vec<f64> = top.iter().map(|m| m.percent).collect();
                let colors: Vec<_> = percents.iter().map(|p| sequential_color(p / 100.0)).collect();
                ChartPlotter::draw_horizontal_bars(
                    &mut cols[1],
                    "missing_values",
                    &labels,
                    &percents,
                    Some(&colors),
                    "Missing (%)",
                );
            }
        });
    }

    fn show_distributions(&mut self, ui: &mut egui::Ui, data: &HousingData) {
        let Some(summary) = &self.summary else {
            return;
        };
        widgets::section(ui, "📈 Distributions");

        let numeric_options: Vec<String> = summary
            .continuous
            .iter()
            .take(DISTRIBUTION_CHOICES)
            .cloned()
            .collect();
        let categorical_options: Vec<String> = data
            .categorical_columns()
            .into_iter()
            .take(DISTRIBUTION_CHOICES)
            .collect();

        let numeric_choice = &mut self.numeric_choice;
        let categorical_choice = &mut self.categorical_choice;

        ui.columns(2, |cols| {
            let ui = &mut cols[0];
            ui.label(RichText::new("🔢 Numeric variables").strong());
            match widgets::select(ui, "numeric_distribution", "Variable:", numeric_choice, &numeric_options) {
                Some(choice) => {
                    let bins = histogram(&data.present_values(&choice), HISTOGRAM_BINS);
                    let counts: Vec<f64> = bins.iter().map(|b| b.count as f64).collect();
                    ChartPlotter::draw_histogram(
                        ui,
                        "numeric_distribution_plot",
                        &bins,
                        &counts,
                        PRIMARY,
                        &choice,
                        "Frequency",
                        &[],
                    );
                }
                None => {
                    ui.label("No continuous numeric variables.");
                }
            }

            let ui = &mut cols[1];
            ui.label(RichText::new("🏷 Categorical variables").strong());
            match widgets::select(
                ui,
                "categorical_distribution",
                "Variable:",
                categorical_choice,
                &categorical_options,
            ) {
                Some(choice) => {
                    let counts =
                        DatasetSummary::value_counts(&data.text_values(&choice), TOP_CATEGORIES);
                    let labels: Vec<String> = counts.iter().map(|(k, _)| k.clone()).collect();
                    let values: Vec<f64> = counts.iter().map(|(_, v)| *v as f64).collect();
                    ChartPlotter::draw_category_bars(
                        ui,
                        "categorical_distribution_plot",
                        &labels,
                        &values,
                        PRIMARY,
                        "Count",
                    );
                }
                None => {
                    ui.label("No categorical variables.");
                }
            }
        });
    }

    fn show_exports(&mut self, ui: &mut egui::Ui, data: &HousingData) {
        widgets::section(ui, "💾 Export");

        let mut requested = None;
        ui.horizontal(|ui| {
            if ui.button("📥 Download full CSV").clicked() {
                requested = Some(ExportKind::Full);
            }
            if ui.button("📊 Download filtered data").clicked() {
                requested = Some(ExportKind::Filtered);
            }
            if ui.button("📈 Download statistics (Excel)").clicked() {
                requested = Some(ExportKind::Report);
            }
            ui.checkbox(&mut self.open_after_export, "Open after saving");
        });

        if let Some(kind) = requested {
            let result = self.export(kind, data);
            self.notice = Notice::from_save(result);
        }

        if let Some(notice) = &self.notice {
            notice.show(ui);
        }
    }

    fn show_footer(&self, ui: &mut egui::Ui, data: &HousingData) {
        let Some(summary) = &self.summary else {
            return;
        };
        ui.add_space(12.0);
        ui.separator();
        let (missing, share) = summary.total_missing;
        ui.columns(3, |cols| {
            cols[0].vertical_centered(|ui| {
                ui.label(RichText::new("📊 Data quality").strong());
                ui.label(format!(
                    "{} observations, {} variables",
                    crate::model::features::group_thousands(data.row_count() as f64),
                    data.column_count()
                ));
            });
            cols[1].vertical_centered(|ui| {
                ui.label(RichText::new("⚠ Missing data").strong());
                ui.label(format!(
                    "{} cells, {:.2}% of the dataset",
                    crate::model::features::group_thousands(missing as f64),
                    share
                ));
            });
            cols[2].vertical_centered(|ui| {
                ui.label(RichText::new("🎯 Target").strong());
                ui.label(format!("{}, {} priced rows", data.target(), summary.price.count));
            });
        });
    }

    fn export(&self, kind: ExportKind, data: &HousingData) -> anyhow::Result<Option<PathBuf>> {
        let open_after = self.open_after_export;
        match kind {
            ExportKind::Full => {
                let bytes =
                    export::to_csv_bytes(data.frame()).context("Could not serialize the dataset")?;
                widgets::save_bytes(&bytes, FULL_CSV_NAME, "CSV", "csv", open_after)
            }
            ExportKind::Filtered => {
                let bytes = export::to_csv_bytes(self.filtered_frame()?)
                    .context("Could not serialize the filtered data")?;
                widgets::save_bytes(&bytes, FILTERED_CSV_NAME, "CSV", "csv", open_after)
            }
            ExportKind::Report => {
                let bytes = self.report_workbook(data)?;
                widgets::save_bytes(&bytes, REPORT_XLSX_NAME, "Excel", "xlsx", open_after)
            }
        }
    }

    fn filtered_frame(&self) -> anyhow::Result<&DataFrame> {
        let view = self.filtered.as_ref().context("No filtered data yet")?;
        view.frame
            .as_ref()
            .map_err(|e| anyhow::anyhow!("Filtering failed: {}", e))
    }

    /// Raw data, filtered data and the numeric statistics as a three-sheet workbook.
    fn report_workbook(&self, data: &HousingData) -> anyhow::Result<Vec<u8>> {
        let summary = self.summary.as_ref().context("Statistics not computed yet")?;
        let filtered = self.filtered_frame()?;
        let sheets = vec![
            Sheet::from_frame("Raw Data", data.frame()),
            Sheet::from_frame("Filtered Data", filtered),
            statistics_sheet(&summary.numeric),
        ];
        export::to_xlsx_bytes(&sheets).context("Could not build the Excel report")
    }
}

const DESCRIBE_HEADERS: [&str; 10] = [
    "Variable", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max", "CV %",
];

fn describe_row(s: &NumericSummary) -> Vec<String> {
    let d = &s.stats;
    vec![
        s.column.clone(),
        d.count.to_string(),
        number(d.mean, 2),
        number(d.std, 2),
        number(d.min, 2),
        number(d.q25, 2),
        number(d.median, 2),
        number(d.q75, 2),
        number(d.max, 2),
        number(d.cv, 2),
    ]
}

/// Numeric statistics as a worksheet, one row per column.
pub fn statistics_sheet(numeric: &[NumericSummary]) -> Sheet {
    let headers = DESCRIBE_HEADERS.iter().map(|h| h.to_string()).collect();
    let rows = numeric
        .iter()
        .map(|s| {
            let d = &s.stats;
            vec![
                Cell::from(s.column.as_str()),
                Cell::from(d.count as f64),
                Cell::from(d.mean),
                Cell::from(d.std),
                Cell::from(d.min),
                Cell::from(d.q25),
                Cell::from(d.median),
                Cell::from(d.q75),
                Cell::from(d.max),
                Cell::from(d.cv),
            ]
        })
        .collect();
    Sheet::new("Statistics", headers, rows)
}

fn build_filtered_view(
    data: &HousingData,
    key: (Vec<String>, f64, f64),
    selection: ColumnSelection,
) -> FilteredView {
    let frame = filter_by_price(data.frame(), &selection.columns, data.target(), key.1, key.2)
        .map_err(|e| e.to_string());
    let rows = frame
        .as_ref()
        .map(|df| preview_rows(df, MAX_PREVIEW_ROWS))
        .unwrap_or_default();
    FilteredView {
        key,
        selection,
        frame,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::tests::sample_data;

    #[test]
    fn statistics_sheet_has_one_row_per_numeric_column() {
        let data = sample_data();
        let numeric = DatasetSummary::describe_numeric(&data);
        let sheet = statistics_sheet(&numeric);
        assert_eq!(sheet.name, "Statistics");
        assert_eq!(sheet.headers.len(), DESCRIBE_HEADERS.len());
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[0][0], Cell::Text("LotArea".into()));
        assert_eq!(sheet.rows[0][1], Cell::Number(5.0));
    }

    #[test]
    fn filtered_view_matches_selection() {
        let data = sample_data();
        let selection = select_columns(
            &["LotArea".to_string()],
            &data.column_names(),
            data.target(),
        );
        let key = (selection.columns.clone(), 0.0, 200_000.0);
        let view = build_filtered_view(&data, key, selection);
        let frame = view.frame.as_ref().unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[0].len(), 2);
    }
}
