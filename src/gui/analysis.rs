//! Analysis Page
//! Target, correlation, relation, categorical, multivariate and temporal views of the dataset.

use crate::charts::{
    normalize, palette_color, sequential_color, size_radius, BoxGroup, ChartPlotter, Curve, ScatterLayer,
    ACCENT, HIGHLIGHT, PRIMARY, SECONDARY,
};
use crate::data::HousingData;
use crate::gui::widgets::{self, dollars, number};
use crate::stats::distribution::{
    density_heights, gaussian_kde, histogram, linspace, normal_pdf_curve, normal_qq, HistogramBin,
};
use crate::stats::summary::{
    CorrelationMatrix, TargetCorrelations, CORRELATION_MIN_UNIQUE,
};
use crate::stats::{DatasetSummary, Describe, StatsCalculator};
use egui::RichText;
use std::collections::BTreeMap;

const NONE: &str = "None";
const TARGET_BINS: usize = 50;
const TRANSFORM_BINS: usize = 30;
const KDE_POINTS: usize = 100;
const MAX_SUGGESTIONS: usize = 5;
const TOP_CATEGORIES: usize = 20;
/// Period columns offered on the temporal tab, when present.
const TIME_COLUMNS: [&str; 4] = ["YearBuilt", "YearRemodAdd", "YrSold", "MoSold"];
const TRANSFORM_ADVICE: [&str; 3] = ["Not recommended", "✅ Optimal", "Improvement"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisTab {
    Target,
    Correlation,
    Relations,
    Categorical,
    Multivariate,
    Temporal,
}

impl AnalysisTab {
    pub const ALL: [AnalysisTab; 6] = [
        AnalysisTab::Target,
        AnalysisTab::Correlation,
        AnalysisTab::Relations,
        AnalysisTab::Categorical,
        AnalysisTab::Multivariate,
        AnalysisTab::Temporal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisTab::Target => "🎯 Target",
            AnalysisTab::Correlation => "🔄 Correlation",
            AnalysisTab::Relations => "📊 Relations",
            AnalysisTab::Categorical => "🏘 Categorical",
            AnalysisTab::Multivariate => "🎭 Multivariate",
            AnalysisTab::Temporal => "📅 Temporal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CategoricalView {
    BoxPlot,
    MeanPrice,
    Distribution,
}

impl CategoricalView {
    const ALL: [CategoricalView; 3] = [
        CategoricalView::BoxPlot,
        CategoricalView::MeanPrice,
        CategoricalView::Distribution,
    ];

    fn label(&self) -> &'static str {
        match self {
            CategoricalView::BoxPlot => "Box Plot",
            CategoricalView::MeanPrice => "Mean Price",
            CategoricalView::Distribution => "Distribution",
        }
    }
}

/// Skew of one transformation of the target.
#[derive(Debug, Clone, PartialEq)]
struct TransformRow {
    name: &'static str,
    skew: f64,
    advice: &'static str,
}

/// Everything the target tab draws, computed once per dataset.
struct TargetView {
    prices: Vec<f64>,
    stats: Describe,
    skew: f64,
    bins: Vec<HistogramBin>,
    density: Vec<f64>,
    curves: Vec<Curve>,
    threshold: f64,
    qq: Vec<[f64; 2]>,
    transforms: Vec<TransformRow>,
    transformed: Vec<(&'static str, Vec<HistogramBin>)>,
}

impl TargetView {
    fn compute(data: &HousingData) -> Self {
        let prices = data.present_values(data.target());
        let stats = StatsCalculator::describe(&prices);
        let bins = histogram(&prices, TARGET_BINS);
        let density = density_heights(&bins);

        let grid = linspace(stats.min, stats.max, KDE_POINTS);
        let zip_grid = |ys: Vec<f64>| -> Vec<[f64; 2]> {
            grid.iter().zip(ys).map(|(&x, y)| [x, y]).collect()
        };
        let curves = vec![
            Curve::solid("KDE density", zip_grid(gaussian_kde(&prices, &grid)), ACCENT),
            Curve::dashed("Normal distribution", zip_grid(normal_pdf_curve(&prices, &grid)), SECONDARY),
        ];

        let transforms = StatsCalculator::transform_skews(&prices)
            .iter()
            .zip(TRANSFORM_ADVICE)
            .map(|(&(name, skew), advice)| TransformRow { name, skew, advice })
            .collect();

        let log: Vec<f64> = prices.iter().map(|p| p.ln_1p()).collect();
        let sqrt: Vec<f64> = prices.iter().map(|p| p.sqrt()).collect();
        let transformed = vec![
            ("Original", histogram(&prices, TRANSFORM_BINS)),
            ("Log transformation", histogram(&log, TRANSFORM_BINS)),
            ("Square root", histogram(&sqrt, TRANSFORM_BINS)),
        ];

        Self {
            skew: StatsCalculator::skewness(&prices),
            threshold: StatsCalculator::iqr_upper_bound(&prices),
            qq: normal_qq(&prices),
            prices,
            stats,
            bins,
            density,
            curves,
            transforms,
            transformed,
        }
    }
}

struct CorrelationView {
    matrix: CorrelationMatrix,
    top: TargetCorrelations,
}

impl CorrelationView {
    fn compute(data: &HousingData) -> Self {
        let columns = DatasetSummary::high_cardinality_columns(data, CORRELATION_MIN_UNIQUE);
        let matrix = DatasetSummary::correlation_matrix(data, &columns);
        let top = DatasetSummary::target_correlations(&matrix, data.target());
        Self { matrix, top }
    }
}

/// Complete rows for a scatter: every selected column present.
#[derive(Debug, Clone, Default, PartialEq)]
struct PlotRows {
    xs: Vec<f64>,
    ys: Vec<f64>,
    sizes: Option<Vec<f64>>,
    groups: Option<Vec<String>>,
}

impl PlotRows {
    fn len(&self) -> usize {
        self.xs.len()
    }

    fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

fn complete_rows(
    data: &HousingData,
    x: &str,
    y: &str,
    size: Option<&str>,
    color: Option<&str>,
) -> PlotRows {
    let xs = data.numeric_values(x);
    let ys = data.numeric_values(y);
    let sizes = size.map(|c| data.numeric_values(c));
    let groups = color.map(|c| data.text_values(c));
    let present = |v: Option<f64>| v.filter(|v| !v.is_nan());

    let mut rows = PlotRows {
        sizes: sizes.as_ref().map(|_| Vec::new()),
        groups: groups.as_ref().map(|_| Vec::new()),
        ..Default::default()
    };

    for i in 0..xs.len().min(ys.len()) {
        let (Some(xv), Some(yv)) = (present(xs[i]), present(ys[i])) else {
            continue;
        };
        let size_value = match &sizes {
            Some(s) => match s.get(i).copied().and_then(present) {
                Some(v) => Some(v),
                None => continue,
            },
            None => None,
        };
        let group_value = match &groups {
            Some(g) => match g.get(i).cloned().flatten() {
                Some(v) => Some(v),
                None => continue,
            },
            None => None,
        };

        rows.xs.push(xv);
        rows.ys.push(yv);
        if let (Some(out), Some(v)) = (rows.sizes.as_mut(), size_value) {
            out.push(v);
        }
        if let (Some(out), Some(v)) = (rows.groups.as_mut(), group_value) {
            out.push(v);
        }
    }
    rows
}

/// Points split by category and, with a size column, by quantized radius.
/// Layers of one category share a name so the legend shows it once.
fn scatter_layers(rows: &PlotRows) -> Vec<ScatterLayer> {
    let categories: Vec<String> = match &rows.groups {
        Some(groups) => {
            let mut unique: Vec<String> = groups.clone();
            unique.sort();
            unique.dedup();
            unique
        }
        None => vec!["Observations".to_string()],
    };

    let (size_min, size_max) = rows
        .sizes
        .as_ref()
        .map(|s| {
            s.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |acc, &v| (acc.0.min(v), acc.1.max(v)))
        })
        .unwrap_or((0.0, 0.0));

    // (category index, radius in half pixels) -> points
    let mut layers: BTreeMap<(usize, u32), Vec<[f64; 2]>> = BTreeMap::new();
    for i in 0..rows.len() {
        let category = match &rows.groups {
            Some(groups) => categories.binary_search(&groups[i]).unwrap_or(0),
            None => 0,
        };
        let radius = match &rows.sizes {
            Some(sizes) => size_radius(sizes[i], size_min, size_max),
            None => 2.5,
        };
        let key = (category, (radius * 2.0).round() as u32);
        layers.entry(key).or_default().push([rows.xs[i], rows.ys[i]]);
    }

    layers
        .into_iter()
        .map(|((category, half_radius), points)| ScatterLayer {
            name: categories[category].clone(),
            points,
            color: if rows.groups.is_some() {
                palette_color(category)
            } else {
                PRIMARY
            },
            radius: half_radius as f32 / 2.0,
        })
        .collect()
}

/// Correlation summary of a complete X/Y sample.
#[derive(Debug, Clone, PartialEq)]
struct RelationStats {
    r: f64,
    r_squared: f64,
    strength: &'static str,
    fit: Option<(f64, f64)>,
}

fn relation_stats(xs: &[f64], ys: &[f64]) -> RelationStats {
    let r = StatsCalculator::pearson_complete(xs, ys);
    RelationStats {
        r,
        r_squared: r * r,
        strength: StatsCalculator::correlation_strength(r),
        fit: StatsCalculator::linear_fit(xs, ys),
    }
}

fn trend_curve(xs: &[f64], fit: (f64, f64)) -> Option<Curve> {
    let lo = xs.iter().copied().reduce(f64::min)?;
    let hi = xs.iter().copied().reduce(f64::max)?;
    let (slope, intercept) = fit;
    Some(Curve::solid(
        "OLS trend",
        vec![[lo, slope * lo + intercept], [hi, slope * hi + intercept]],
        ACCENT,
    ))
}

/// Numeric columns with enough distinct values for scatter axes, target always included.
fn axis_columns(data: &HousingData) -> Vec<String> {
    let mut columns = DatasetSummary::high_cardinality_columns(data, CORRELATION_MIN_UNIQUE);
    let target = data.target().to_string();
    if data.numeric_columns().contains(&target) && !columns.contains(&target) {
        columns.push(target);
    }
    columns
}

/// Y choices: the target first, then the other axis columns except `x`.
fn y_options(columns: &[String], target: &str, x: &str) -> Vec<String> {
    let mut options = vec![target.to_string()];
    options.extend(
        columns
            .iter()
            .filter(|c| c.as_str() != target && c.as_str() != x)
            .cloned(),
    );
    options
}

fn suggestions(columns: &[String], x: &str, target: &str) -> Vec<String> {
    columns
        .iter()
        .filter(|c| c.as_str() != x && c.as_str() != target)
        .take(MAX_SUGGESTIONS)
        .cloned()
        .collect()
}

fn with_none(options: impl IntoIterator<Item = String>) -> Vec<String> {
    std::iter::once(NONE.to_string()).chain(options).collect()
}

fn optional(choice: &Option<String>) -> Option<&str> {
    choice.as_deref().filter(|c| *c != NONE)
}

/// Target values per category, sorted by category.
fn prices_by_category(data: &HousingData, column: &str) -> Vec<BoxGroup> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (key, price) in data.text_values(column).into_iter().zip(data.sale_prices()) {
        if let (Some(key), Some(price)) = (key, price) {
            groups.entry(key).or_default().push(price);
        }
    }
    groups
        .into_iter()
        .map(|(label, values)| BoxGroup { label, values })
        .collect()
}

fn describe_table(x: &str, y: &str, xs: &[f64], ys: &[f64]) -> (Vec<String>, Vec<Vec<String>>) {
    let dx = StatsCalculator::describe(xs);
    let dy = StatsCalculator::describe(ys);
    let row = |name: &str, f: fn(&Describe) -> f64| {
        vec![name.to_string(), number(f(&dx), 2), number(f(&dy), 2)]
    };
    let rows = vec![
        row("count", |d| d.count as f64),
        row("mean", |d| d.mean),
        row("std", |d| d.std),
        row("min", |d| d.min),
        row("25%", |d| d.q25),
        row("50%", |d| d.median),
        row("75%", |d| d.q75),
        row("max", |d| d.max),
    ];
    (vec![String::new(), x.to_string(), y.to_string()], rows)
}

#[derive(Default)]
struct RelationState {
    x: Option<String>,
    y: Option<String>,
    color: Option<String>,
}

#[derive(Default)]
struct MultivariateState {
    x: Option<String>,
    y: Option<String>,
    size: Option<String>,
    color: Option<String>,
}

/// Analysis page state.
pub struct AnalysisPage {
    tab: AnalysisTab,
    target: Option<TargetView>,
    correlation: Option<CorrelationView>,
    axis_columns: Option<Vec<String>>,
    relation: RelationState,
    categorical: Option<String>,
    categorical_view: CategoricalView,
    multivariate: MultivariateState,
    temporal: Option<String>,
}

impl Default for AnalysisPage {
    fn default() -> Self {
        Self {
            tab: AnalysisTab::Target,
            target: None,
            correlation: None,
            axis_columns: None,
            relation: RelationState::default(),
            categorical: None,
            categorical_view: CategoricalView::BoxPlot,
            multivariate: MultivariateState::default(),
            temporal: None,
        }
    }
}

impl AnalysisPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, ui: &mut egui::Ui, data: &HousingData) {
        widgets::page_header(
            ui,
            "📈 Exploratory Analysis",
            Some("Distributions, correlations and relations behind the sale price"),
        );

        ui.horizontal_wrapped(|ui| {
            for tab in AnalysisTab::ALL {
                ui.selectable_value(&mut self.tab, tab, RichText::new(tab.label()).size(15.0));
            }
        });
        ui.separator();

        match self.tab {
            AnalysisTab::Target => self.show_target(ui, data),
            AnalysisTab::Correlation => self.show_correlation(ui, data),
            AnalysisTab::Relations => self.show_relations(ui, data),
            AnalysisTab::Categorical => self.show_categorical(ui, data),
            AnalysisTab::Multivariate => self.show_multivariate(ui, data),
            AnalysisTab::Temporal => self.show_temporal(ui, data),
        }
    }

    fn axis_columns(&mut self, data: &HousingData) -> Vec<String> {
        self.axis_columns
            .get_or_insert_with(|| axis_columns(data))
            .clone()
    }

    fn show_target(&mut self, ui: &mut egui::Ui, data: &HousingData) {
        let view = self.target.get_or_insert_with(|| TargetView::compute(data));
        widgets::section(ui, &format!("🎯 Target variable: {}", data.target()));
        if view.prices.is_empty() {
            widgets::warning_box(ui, "No sale prices in the dataset.");
            return;
        }

        widgets::metric_row(
            ui,
            &[
                ("Mean", dollars(view.stats.mean)),
                ("Median", dollars(view.stats.median)),
                ("Std deviation", dollars(view.stats.std)),
                ("Skewness", number(view.skew, 2)),
            ],
        );

        ui.add_space(8.0);
        ui.columns(2, |cols| {
            cols[0].label(RichText::new("Distribution with normality check").strong());
            ChartPlotter::draw_histogram(
                &mut cols[0],
                "target_histogram",
                &view.bins,
                &view.density,
                PRIMARY,
                "Sale price ($)",
                "Probability density",
                &view.curves,
            );

            cols[1].label(RichText::new("Outliers").strong());
            let threshold = format!("Outlier threshold: {}", dollars(view.threshold));
            ChartPlotter::draw_box_plot(
                &mut cols[1],
                "target_box",
                &[BoxGroup {
                    label: data.target().to_string(),
                    values: view.prices.clone(),
                }],
                "Sale price ($)",
                Some((threshold.as_str(), view.threshold)),
            );
        });

        ui.add_space(8.0);
        ui.columns(2, |cols| {
            cols[0].label(RichText::new("QQ plot").strong());
            ChartPlotter::draw_qq(&mut cols[0], "target_qq", &view.qq);

            cols[1].label(RichText::new("🔧 Transformations").strong());
            let rows: Vec<Vec<String>> = view
                .transforms
                .iter()
                .map(|t| vec![t.name.to_string(), number(t.skew, 4), t.advice.to_string()])
                .collect();
            ChartPlotter::draw_table(
                &mut cols[1],
                "transform_table",
                &["Transformation", "Skewness", "Recommendation"],
                &rows,
            );
        });

        ui.add_space(8.0);
        ui.columns(view.transformed.len(), |cols| {
            for (i, (col, (name, bins))) in cols.iter_mut().zip(view.transformed.iter()).enumerate() {
                col.label(RichText::new(*name).strong());
                let counts: Vec<f64> = bins.iter().map(|b| b.count as f64).collect();
                ChartPlotter::draw_histogram(
                    col,
                    &format!("transformed_{}", i),
                    bins,
                    &counts,
                    palette_color(i),
                    name,
                    "Count",
                    &[],
                );
            }
        });
    }

    fn show_correlation(&mut self, ui: &mut egui::Ui, data: &HousingData) {
        let view = self
            .correlation
            .get_or_insert_with(|| CorrelationView::compute(data));

        widgets::section(ui, "🔄 Correlation matrix");
        ChartPlotter::draw_heatmap(ui, &view.matrix);

        widgets::section(ui, &format!("🎯 Correlations with {}", data.target()));
        if view.top.positive.is_empty() {
            widgets::warning_box(
                ui,
                &format!("{} is not among the correlated columns.", data.target()),
            );
            return;
        }

        ui.columns(2, |cols| {
            correlation_bars(&mut cols[0], "top_positive", "Top 10 positive", &view.top.positive, false);
            correlation_bars(&mut cols[1], "top_negative", "Top 10 negative", &view.top.negative, true);
        });
    }

    fn show_relations(&mut self, ui: &mut egui::Ui, data: &HousingData) {
        widgets::section(ui, "📊 Relations between variables");
        let columns = self.axis_columns(data);
        let target = data.target().to_string();
        if self.relation.x.is_none() {
            self.relation.x = columns.get(1).or(columns.first()).cloned();
        }
        let colors = with_none(data.categorical_columns());

        let mut selection = (None, None, None);
        ui.columns(3, |cols| {
            selection.0 = widgets::select(&mut cols[0], "rel_x", "X:", &mut self.relation.x, &columns);
            let ys = y_options(&columns, &target, selection.0.as_deref().unwrap_or(""));
            selection.1 = widgets::select(&mut cols[1], "rel_y", "Y:", &mut self.relation.y, &ys);
            selection.2 = widgets::select(&mut cols[2], "rel_color", "Color:", &mut self.relation.color, &colors);
        });
        let (Some(x), Some(y)) = (selection.0, selection.1) else {
            widgets::warning_box(ui, "No numeric columns to plot.");
            return;
        };

        if x == y {
            same_axis_error(ui, &columns, &x, &target);
            return;
        }

        let color = optional(&self.relation.color);
        let rows = complete_rows(data, &x, &y, None, color);
        if rows.is_empty() {
            widgets::warning_box(ui, "No data left after dropping rows with missing values.");
            widgets::info_box(ui, "Select other variables.");
            return;
        }

        let stats = relation_stats(&rows.xs, &rows.ys);
        let trend = stats.fit.and_then(|fit| trend_curve(&rows.xs, fit));
        ui.label(
            RichText::new(format!(
                "Correlation: {}   R²: {}",
                number(stats.r, 3),
                number(stats.r_squared, 3)
            ))
            .strong(),
        );
        ChartPlotter::draw_scatter(ui, "relation_scatter", &scatter_layers(&rows), trend.as_ref(), &x, &y);

        egui::CollapsingHeader::new("📈 Detailed metrics")
            .default_open(true)
            .show(ui, |ui| {
                ui.columns(2, |cols| {
                    widgets::metric(&mut cols[0], "Correlation", &number(stats.r, 3));
                    widgets::metric(&mut cols[0], "Coefficient of determination (R²)", &number(stats.r_squared, 3));
                    widgets::info_box(&mut cols[0], &format!("Relation: {}", stats.strength));

                    cols[1].label(RichText::new("Statistics").strong());
                    let (headers, table) = describe_table(&x, &y, &rows.xs, &rows.ys);
                    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
                    ChartPlotter::draw_table(&mut cols[1], "relation_describe", &headers, &table);
                });
            });

        widgets::info_box(
            ui,
            &format!("Data used: {} observations (non-missing values)", rows.len()),
        );
    }

    fn show_categorical(&mut self, ui: &mut egui::Ui, data: &HousingData) {
        widgets::section(ui, "🏘 Categorical variables");
        let columns = data.categorical_columns();

        let mut column = None;
        ui.columns(2, |cols| {
            column = widgets::select(&mut cols[0], "cat_var", "Variable:", &mut self.categorical, &columns);
            cols[1].horizontal(|ui| {
                ui.label("Analysis:");
                egui::ComboBox::from_id_salt("cat_view")
                    .selected_text(self.categorical_view.label())
                    .show_ui(ui, |ui| {
                        for view in CategoricalView::ALL {
                            ui.selectable_value(&mut self.categorical_view, view, view.label());
                        }
                    });
            });
        });
        let Some(column) = column else {
            widgets::info_box(ui, "The dataset has no categorical columns.");
            return;
        };

        match self.categorical_view {
            CategoricalView::BoxPlot => {
                ui.label(RichText::new(format!("Price distribution by {}", column)).strong());
                let groups = prices_by_category(data, &column);
                ChartPlotter::draw_box_plot(ui, "category_box", &groups, "Sale price ($)", None);
            }
            CategoricalView::MeanPrice => {
                ui.label(RichText::new(format!("Mean price by {}", column)).strong());
                let mut stats = DatasetSummary::target_by_category(data, &column);
                stats.sort_by(|a, b| a.mean.partial_cmp(&b.mean).unwrap_or(std::cmp::Ordering::Equal));
                let labels: Vec<String> = stats.iter().map(|s| s.key.clone()).collect();
                let means: Vec<f64> = stats.iter().map(|s| s.mean).collect();
                let stds: Vec<f64> = stats.iter().map(|s| s.std).collect();
                ChartPlotter::draw_error_bars(ui, "category_mean", &labels, &means, &stds, "Mean price ($)");
            }
            CategoricalView::Distribution => {
                ui.label(RichText::new(format!("Frequencies of {}", column)).strong());
                let counts = DatasetSummary::value_counts(&data.text_values(&column), TOP_CATEGORIES);
                let labels: Vec<String> = counts.iter().map(|(k, _)| k.clone()).collect();
                let values: Vec<f64> = counts.iter().map(|(_, c)| *c as f64).collect();
                ChartPlotter::draw_category_bars(ui, "category_counts", &labels, &values, HIGHLIGHT, "Count");
            }
        }
    }

    fn show_multivariate(&mut self, ui: &mut egui::Ui, data: &HousingData) {
        widgets::section(ui, "🎭 Multivariate analysis");
        let columns = self.axis_columns(data);
        let target = data.target().to_string();
        if self.multivariate.x.is_none() {
            self.multivariate.x = columns.get(1).or(columns.first()).cloned();
        }
        let colors = with_none(data.categorical_columns());
        let state = &mut self.multivariate;

        let mut picked = (None, None, None, None);
        ui.columns(4, |cols| {
            picked.0 = widgets::select(&mut cols[0], "multi_x", "X:", &mut state.x, &columns);
            let x = picked.0.clone().unwrap_or_default();
            let ys = y_options(&columns, &target, &x);
            picked.1 = widgets::select(&mut cols[1], "multi_y", "Y:", &mut state.y, &ys);
            let y = picked.1.clone().unwrap_or_default();
            let sizes = with_none(columns.iter().filter(|c| **c != x && **c != y).cloned());
            picked.2 = widgets::select(&mut cols[2], "multi_size", "Size:", &mut state.size, &sizes);
            picked.3 = widgets::select(&mut cols[3], "multi_color", "Color:", &mut state.color, &colors);
        });
        let (Some(x), Some(y)) = (picked.0, picked.1) else {
            widgets::warning_box(ui, "No numeric columns to plot.");
            return;
        };

        if x == y {
            same_axis_error(ui, &columns, &x, &target);
            return;
        }

        let size = optional(&state.size);
        let color = optional(&state.color);
        let rows = complete_rows(data, &x, &y, size, color);
        if rows.is_empty() {
            widgets::warning_box(ui, "Not enough data: every row had a missing value.");
            widgets::info_box(ui, "Select other variables or check the missing values.");
            return;
        }

        ChartPlotter::draw_scatter(ui, "multivariate_scatter", &scatter_layers(&rows), None, &x, &y);

        egui::CollapsingHeader::new("ℹ Data used").show(ui, |ui| {
            let used: Vec<&str> = [Some(x.as_str()), Some(y.as_str()), size, color]
                .into_iter()
                .flatten()
                .collect();
            ui.label(format!("Points shown: {}", rows.len()));
            ui.label(format!("Columns used: {}", used.join(", ")));
            if let Some(size) = size {
                ui.label(format!("Size: {}", size));
            }
            if let (Some(color), Some(groups)) = (color, &rows.groups) {
                let mut unique = groups.clone();
                unique.sort();
                unique.dedup();
                ui.label(format!("Color: {} ({} categories)", color, unique.len()));
            }
        });
    }

    fn show_temporal(&mut self, ui: &mut egui::Ui, data: &HousingData) {
        widgets::section(ui, "📅 Temporal analysis");
        let available: Vec<String> = TIME_COLUMNS
            .iter()
            .filter(|c| data.has_column(c))
            .map(|c| c.to_string())
            .collect();

        let Some(column) = widgets::select(ui, "temporal_var", "Period:", &mut self.temporal, &available)
        else {
            widgets::info_box(ui, "No time columns in the dataset.");
            return;
        };

        let stats = DatasetSummary::target_by_period(data, &column);
        let xs: Vec<f64> = stats.iter().map(|s| s.key as f64).collect();
        let means: Vec<f64> = stats.iter().map(|s| s.mean).collect();
        let stds: Vec<f64> = stats.iter().map(|s| s.std).collect();
        let counts: Vec<f64> = stats.iter().map(|s| s.count as f64).collect();

        ui.columns(2, |cols| {
            cols[0].label(RichText::new(format!("Mean price by {}", column)).strong());
            ChartPlotter::draw_band_line(&mut cols[0], "temporal_mean", &xs, &means, &stds, &column, "Mean price ($)");
            cols[1].label(RichText::new(format!("Sales by {}", column)).strong());
            ChartPlotter::draw_count_bars(&mut cols[1], "temporal_count", &xs, &counts, &column, "Sales");
        });
    }
}

fn correlation_bars(ui: &mut egui::Ui, id: &str, title: &str, entries: &[(String, f64)], reversed: bool) {
    ui.label(RichText::new(title).strong());
    let labels: Vec<String> = entries.iter().map(|(c, _)| c.clone()).collect();
    let values: Vec<f64> = entries.iter().map(|(_, r)| *r).collect();
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |acc, &v| (acc.0.min(v), acc.1.max(v)));
    let colors: Vec<_> = values
        .iter()
        .map(|&v| {
            let t = normalize(v, lo, hi);
            sequential_color(if reversed { 1.0 - t } else { t })
        })
        .collect();
    ChartPlotter::draw_horizontal_bars(ui, id, &labels, &values, Some(&colors), "Correlation coefficient");
}

fn same_axis_error(ui: &mut egui::Ui, columns: &[String], x: &str, target: &str) {
    widgets::error_box(ui, "X and Y cannot be the same variable.");
    widgets::info_box(ui, "Select different variables for the two axes.");
    let alternatives = suggestions(columns, x, target);
    if !alternatives.is_empty() {
        ui.label(RichText::new("Suggested variables for Y:").strong());
        for name in alternatives {
            ui.label(format!("  • {}", name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::tests::sample_data;

    #[test]
    fn y_options_start_with_target_and_skip_x() {
        let columns: Vec<String> = ["LotArea", "GrLivArea", "SalePrice"].iter().map(|s| s.to_string()).collect();
        assert_eq!(y_options(&columns, "SalePrice", "LotArea"), vec!["SalePrice", "GrLivArea"]);
        assert_eq!(y_options(&columns, "SalePrice", "SalePrice"), vec!["SalePrice", "LotArea", "GrLivArea"]);
    }

    #[test]
    fn suggestions_exclude_axis_and_target() {
        let columns: Vec<String> = (0..8).map(|i| format!("C{}", i)).chain(["SalePrice".to_string()]).collect();
        let picks = suggestions(&columns, "C0", "SalePrice");
        assert_eq!(picks, vec!["C1", "C2", "C3", "C4", "C5"]);
    }

    #[test]
    fn complete_rows_drop_any_missing_value() {
        let data = sample_data();
        let rows = complete_rows(&data, "GarageYrBlt", "SalePrice", None, None);
        assert_eq!(rows.len(), 4);
        assert!(rows.groups.is_none());

        let rows = complete_rows(&data, "GarageYrBlt", "SalePrice", Some("LotArea"), Some("MSZoning"));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.sizes.as_ref().map(Vec::len), Some(3));
        assert_eq!(rows.groups, Some(vec!["RL".to_string(), "RM".to_string(), "RL".to_string()]));
    }

    #[test]
    fn layers_group_by_category() {
        let data = sample_data();
        let rows = complete_rows(&data, "LotArea", "SalePrice", None, Some("MSZoning"));
        let layers = scatter_layers(&rows);
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].name, "RL");
        assert_eq!(layers[0].points.len(), 3);
        assert_eq!(layers[1].name, "RM");

        let plain = scatter_layers(&complete_rows(&data, "LotArea", "SalePrice", None, None));
        assert_eq!(plain.len(), 1);
        assert_eq!(plain[0].points.len(), 5);
        assert_eq!(plain[0].color, PRIMARY);
    }

    #[test]
    fn relation_of_a_line_is_perfect() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [3.0, 5.0, 7.0, 9.0];
        let stats = relation_stats(&xs, &ys);
        assert!((stats.r - 1.0).abs() < 1e-12);
        assert!((stats.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(stats.strength, "Very strong");
        let (slope, intercept) = stats.fit.unwrap();
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);

        let curve = trend_curve(&xs, (slope, intercept)).unwrap();
        assert_eq!(curve.points, vec![[1.0, 3.0], [4.0, 9.0]]);
    }

    #[test]
    fn prices_grouped_by_category() {
        let groups = prices_by_category(&sample_data(), "MSZoning");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "RL");
        assert_eq!(groups[0].values, vec![208500.0, 181500.0, 250000.0]);
        assert_eq!(groups[1].values, vec![140000.0]);
    }

    #[test]
    fn transform_table_recommends_log() {
        let view = TargetView::compute(&sample_data());
        assert_eq!(view.transforms.len(), 3);
        assert_eq!(view.transforms[1].name, "Log(x+1)");
        assert_eq!(view.transforms[1].advice, "✅ Optimal");
        assert_eq!(view.curves.len(), 2);
        assert_eq!(view.curves[0].points.len(), KDE_POINTS);
        assert_eq!(view.bins.len(), TARGET_BINS);
        assert_eq!(view.qq.len(), 5);
    }

    #[test]
    fn none_choice_is_absent() {
        assert_eq!(optional(&Some(NONE.to_string())), None);
        assert_eq!(optional(&Some("MSZoning".to_string())), Some("MSZoning"));
        assert_eq!(with_none(vec!["A".to_string()]), vec!["None", "A"]);
    }
}
