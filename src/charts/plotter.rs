//! Chart Plotter Module
//! Builds the dashboard charts with egui_plot, plus a painted correlation heatmap.

use crate::stats::distribution::HistogramBin;
use crate::stats::summary::CorrelationMatrix;
use crate::stats::StatsCalculator;
use egui::{Align2, Color32, FontId, RichText, Sense, Stroke, Vec2};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, HLine, Legend, Line, LineStyle, Plot, PlotPoints,
    Points, Polygon,
};

/// Main series color.
pub const PRIMARY: Color32 = Color32::from_rgb(102, 126, 234);
/// Overlays such as KDE curves and trendlines.
pub const ACCENT: Color32 = Color32::from_rgb(255, 107, 107);
pub const SECONDARY: Color32 = Color32::from_rgb(78, 205, 196);
pub const HIGHLIGHT: Color32 = Color32::from_rgb(255, 167, 38);

/// Qualitative palette for category colors.
pub const PALETTE: [Color32; 9] = [
    Color32::from_rgb(228, 26, 28),   // Red
    Color32::from_rgb(55, 126, 184),  // Blue
    Color32::from_rgb(77, 175, 74),   // Green
    Color32::from_rgb(152, 78, 163),  // Purple
    Color32::from_rgb(255, 127, 0),   // Orange
    Color32::from_rgb(200, 200, 51),  // Yellow
    Color32::from_rgb(166, 86, 40),   // Brown
    Color32::from_rgb(247, 129, 191), // Pink
    Color32::from_rgb(153, 153, 153), // Grey
];

/// Viridis stops for sequential color scales.
const VIRIDIS: [Color32; 5] = [
    Color32::from_rgb(68, 1, 84),
    Color32::from_rgb(59, 82, 139),
    Color32::from_rgb(33, 145, 140),
    Color32::from_rgb(94, 201, 98),
    Color32::from_rgb(253, 231, 37),
];

/// Radius range for size-encoded scatter points.
const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 9.0;

pub const CHART_HEIGHT: f32 = 320.0;
pub const SMALL_CHART_HEIGHT: f32 = 220.0;

/// A named polyline drawn on top of a chart.
#[derive(Debug, Clone)]
pub struct Curve {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub color: Color32,
    pub dashed: bool,
}

impl Curve {
    pub fn solid(name: &str, points: Vec<[f64; 2]>, color: Color32) -> Self {
        Self {
            name: name.to_string(),
            points,
            color,
            dashed: false,
        }
    }

    pub fn dashed(name: &str, points: Vec<[f64; 2]>, color: Color32) -> Self {
        Self {
            dashed: true,
            ..Self::solid(name, points, color)
        }
    }
}

/// One group of scatter points sharing a color and size.
#[derive(Debug, Clone)]
pub struct ScatterLayer {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub color: Color32,
    pub radius: f32,
}

/// One labeled box in a box plot.
#[derive(Debug, Clone)]
pub struct BoxGroup {
    pub label: String,
    pub values: Vec<f64>,
}

/// Box statistics: whiskers at the most extreme values within 1.5 IQR of the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

/// Color for a category index.
pub fn palette_color(index: usize) -> Color32 {
    PALETTE[index % PALETTE.len()]
}

fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgb(mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()))
}

/// Red for +1, white for 0, blue for -1. NaN renders grey.
pub fn diverging_color(r: f64) -> Color32 {
    const BLUE: Color32 = Color32::from_rgb(5, 48, 97);
    const RED: Color32 = Color32::from_rgb(103, 0, 31);
    if r.is_nan() {
        return Color32::GRAY;
    }
    let r = r.clamp(-1.0, 1.0) as f32;
    if r >= 0.0 {
        lerp_color(Color32::WHITE, RED, r)
    } else {
        lerp_color(Color32::WHITE, BLUE, -r)
    }
}

/// Viridis color for `t` in [0, 1].
pub fn sequential_color(t: f64) -> Color32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    lerp_color(VIRIDIS[idx], VIRIDIS[idx + 1], (scaled - idx as f64) as f32)
}

/// Map `value` from `[min, max]` onto [0, 1].
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// Point radius for size encoding.
pub fn size_radius(value: f64, min: f64, max: f64) -> f32 {
    MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * normalize(value, min, max) as f32
}

/// Closed polygon between `lower` and `upper` along `xs`.
pub fn band_polygon(xs: &[f64], lower: &[f64], upper: &[f64]) -> Vec<[f64; 2]> {
    let n = xs.len().min(lower.len()).min(upper.len());
    let mut points: Vec<[f64; 2]> = (0..n).map(|i| [xs[i], upper[i]]).collect();
    points.extend((0..n).rev().map(|i| [xs[i], lower[i]]));
    points
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let sorted = StatsCalculator::sorted(values);
    if sorted.is_empty() {
        return None;
    }

    let q1 = StatsCalculator::percentile(&sorted, 25.0);
    let median = StatsCalculator::percentile(&sorted, 50.0);
    let q3 = StatsCalculator::percentile(&sorted, 75.0);
    let iqr = q3 - q1;
    let lower_whisker = sorted
        .iter()
        .copied()
        .find(|&v| v >= q1 - 1.5 * iqr)
        .unwrap_or(q1);
    let upper_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= q3 + 1.5 * iqr)
        .unwrap_or(q3);

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
    })
}

/// Tick label for category axes: the label at an integer position, blank elsewhere.
fn category_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

fn styled_line(curve: &Curve) -> Line {
    let line = Line::new(PlotPoints::from_iter(curve.points.iter().copied()))
        .color(curve.color)
        .width(2.0)
        .name(&curve.name);
    if curve.dashed {
        line.style(LineStyle::dashed_dense())
    } else {
        line
    }
}

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Histogram bars with optional curve overlays. With `density`, bar heights integrate to one.
    pub fn draw_histogram(
        ui: &mut egui::Ui,
        id: &str,
        bins: &[HistogramBin],
        heights: &[f64],
        color: Color32,
        x_label: &str,
        y_label: &str,
        curves: &[Curve],
    ) {
        let bars: Vec<Bar> = bins
            .iter()
            .zip(heights.iter())
            .map(|(bin, &h)| {
                Bar::new(bin.center(), h)
                    .width(bin.width())
                    .name(format!("{:.0} - {:.0}: {}", bin.start, bin.end, bin.count))
            })
            .collect();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(color.gamma_multiply(0.8))
                        .name("Distribution"),
                );
                for curve in curves {
                    plot_ui.line(styled_line(curve));
                }
            });
    }

    /// Box per group, optionally with a horizontal threshold line.
    pub fn draw_box_plot(
        ui: &mut egui::Ui,
        id: &str,
        groups: &[BoxGroup],
        y_label: &str,
        threshold: Option<(&str, f64)>,
    ) {
        let labels: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();
        let single = groups.len() == 1;

        Plot::new(id)
            .height(CHART_HEIGHT)
            .y_axis_label(y_label)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                for (i, group) in groups.iter().enumerate() {
                    let Some(stats) = box_stats(&group.values) else {
                        continue;
                    };
                    let color = if single { HIGHLIGHT } else { palette_color(i) };

                    let elem = BoxElem::new(
                        i as f64,
                        BoxSpread::new(
                            stats.lower_whisker,
                            stats.q1,
                            stats.median,
                            stats.q3,
                            stats.upper_whisker,
                        ),
                    )
                    .box_width(0.5)
                    .fill(color.gamma_multiply(0.3))
                    .stroke(Stroke::new(1.5, color));
                    plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&group.label));

                    // Outliers beyond the whiskers
                    let outliers: Vec<[f64; 2]> = group
                        .values
                        .iter()
                        .filter(|&&v| v < stats.lower_whisker || v > stats.upper_whisker)
                        .map(|&v| [i as f64, v])
                        .collect();
                    if !outliers.is_empty() {
                        plot_ui.points(
                            Points::new(PlotPoints::from_iter(outliers))
                                .radius(2.5)
                                .color(color),
                        );
                    }
                }

                if let Some((name, y)) = threshold {
                    plot_ui.hline(
                        HLine::new(y)
                            .color(ACCENT)
                            .style(LineStyle::dashed_loose())
                            .name(name),
                    );
                }
            });
    }

    /// QQ scatter with the identity reference line.
    pub fn draw_qq(ui: &mut egui::Ui, id: &str, points: &[[f64; 2]]) {
        let (lo, hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |acc, p| {
            (acc.0.min(p[0]).min(p[1]), acc.1.max(p[0]).max(p[1]))
        });

        Plot::new(id)
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .x_axis_label("Theoretical quantiles")
            .y_axis_label("Observed quantiles")
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(2.5)
                        .color(PRIMARY)
                        .name("Observed quantiles"),
                );
                if lo.is_finite() && hi.is_finite() {
                    plot_ui.line(styled_line(&Curve::dashed(
                        "Normal reference",
                        vec![[lo, lo], [hi, hi]],
                        ACCENT,
                    )));
                }
            });
    }

    /// Horizontal bars, one per label, first label at the top.
    /// `colors` gives a per-bar color; otherwise bars use `PRIMARY`.
    pub fn draw_horizontal_bars(
        ui: &mut egui::Ui,
        id: &str,
        labels: &[String],
        values: &[f64],
        colors: Option<&[Color32]>,
        x_label: &str,
    ) {
        let n = labels.len().min(values.len());
        // Reverse positions so the first entry is drawn on top.
        let positions: Vec<String> = labels[..n].iter().rev().cloned().collect();
        let bars: Vec<Bar> = (0..n)
            .map(|i| {
                let color = colors.and_then(|c| c.get(i).copied()).unwrap_or(PRIMARY);
                Bar::new((n - 1 - i) as f64, values[i])
                    .width(0.7)
                    .fill(color)
                    .name(&labels[i])
            })
            .collect();

        let height = (n as f32 * 24.0).clamp(SMALL_CHART_HEIGHT, 520.0);
        Plot::new(id)
            .height(height)
            .x_axis_label(x_label)
            .allow_scroll(false)
            .show_grid([true, false])
            .y_axis_formatter(move |mark, _range| category_label(&positions, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).horizontal());
            });
    }

    /// Horizontal mean bars with ±std whiskers, colored by mean.
    pub fn draw_error_bars(
        ui: &mut egui::Ui,
        id: &str,
        labels: &[String],
        means: &[f64],
        stds: &[f64],
        x_label: &str,
    ) {
        let n = labels.len().min(means.len()).min(stds.len());
        let (lo, hi) = means[..n]
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |acc, &m| (acc.0.min(m), acc.1.max(m)));
        let colors: Vec<Color32> = means[..n]
            .iter()
            .map(|&m| sequential_color(normalize(m, lo, hi)))
            .collect();

        let positions: Vec<String> = labels[..n].iter().rev().cloned().collect();
        let bars: Vec<Bar> = (0..n)
            .map(|i| {
                Bar::new((n - 1 - i) as f64, means[i])
                    .width(0.7)
                    .fill(colors[i])
                    .name(&labels[i])
            })
            .collect();

        let height = (n as f32 * 24.0).clamp(SMALL_CHART_HEIGHT, 520.0);
        Plot::new(id)
            .height(height)
            .x_axis_label(x_label)
            .allow_scroll(false)
            .y_axis_formatter(move |mark, _range| category_label(&positions, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).horizontal());
                for i in 0..n {
                    if stds[i].is_nan() {
                        continue;
                    }
                    let y = (n - 1 - i) as f64;
                    plot_ui.line(
                        Line::new(PlotPoints::from_iter([
                            [means[i] - stds[i], y],
                            [means[i] + stds[i], y],
                        ]))
                        .color(Color32::DARK_GRAY)
                        .width(1.5),
                    );
                }
            });
    }

    /// Vertical bars over numeric x positions (counts per year, per bin).
    pub fn draw_count_bars(
        ui: &mut egui::Ui,
        id: &str,
        xs: &[f64],
        counts: &[f64],
        x_label: &str,
        y_label: &str,
    ) {
        let (lo, hi) = counts
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |acc, &c| (acc.0.min(c), acc.1.max(c)));
        let bars: Vec<Bar> = xs
            .iter()
            .zip(counts.iter())
            .map(|(&x, &c)| {
                Bar::new(x, c)
                    .width(0.8)
                    .fill(sequential_color(normalize(c, lo, hi)))
            })
            .collect();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Vertical bars over category labels.
    pub fn draw_category_bars(
        ui: &mut egui::Ui,
        id: &str,
        labels: &[String],
        values: &[f64],
        color: Color32,
        y_label: &str,
    ) {
        let names = labels.to_vec();
        let bars: Vec<Bar> = labels
            .iter()
            .zip(values.iter())
            .enumerate()
            .map(|(i, (label, &v))| Bar::new(i as f64, v).width(0.7).name(label))
            .collect();

        Plot::new(id)
            .height(SMALL_CHART_HEIGHT)
            .y_axis_label(y_label)
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| category_label(&names, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(color));
            });
    }

    /// Scatter layers with an optional trendline.
    pub fn draw_scatter(
        ui: &mut egui::Ui,
        id: &str,
        layers: &[ScatterLayer],
        trend: Option<&Curve>,
        x_label: &str,
        y_label: &str,
    ) {
        Plot::new(id)
            .height(420.0)
            .legend(Legend::default())
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                for layer in layers {
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(layer.points.iter().copied()))
                            .radius(layer.radius)
                            .color(layer.color.gamma_multiply(0.7))
                            .name(&layer.name),
                    );
                }
                if let Some(curve) = trend {
                    plot_ui.line(styled_line(curve));
                }
            });
    }

    /// Mean line with markers and a shaded ±std band.
    pub fn draw_band_line(
        ui: &mut egui::Ui,
        id: &str,
        xs: &[f64],
        means: &[f64],
        stds: &[f64],
        x_label: &str,
        y_label: &str,
    ) {
        let std_or_zero = |i: usize| stds.get(i).copied().filter(|s| !s.is_nan()).unwrap_or(0.0);
        let upper: Vec<f64> = means.iter().enumerate().map(|(i, m)| m + std_or_zero(i)).collect();
        let lower: Vec<f64> = means.iter().enumerate().map(|(i, m)| m - std_or_zero(i)).collect();
        let band = band_polygon(xs, &lower, &upper);
        let mean_points: Vec<[f64; 2]> = xs.iter().zip(means.iter()).map(|(&x, &m)| [x, m]).collect();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                if band.len() > 2 {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from_iter(band.iter().copied()))
                            .fill_color(Color32::from_gray(200).gamma_multiply(0.4))
                            .stroke(Stroke::new(0.5, Color32::LIGHT_GRAY))
                            .name("± Std dev"),
                    );
                }
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(mean_points.iter().copied()))
                        .color(ACCENT)
                        .width(3.0)
                        .name("Mean price"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(mean_points.iter().copied()))
                        .radius(3.0)
                        .color(ACCENT),
                );
            });
    }

    /// Correlation matrix as a grid of colored cells, values printed when they fit.
    pub fn draw_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        let n = matrix.columns.len();
        if n == 0 {
            ui.label("No columns to correlate.");
            return;
        }

        let label_width = 110.0;
        let available = (ui.available_width() - label_width).max(100.0);
        let cell = (available / n as f32).clamp(8.0, 48.0);
        let size = Vec2::new(label_width + cell * n as f32, cell * n as f32);

        let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
        let painter = ui.painter_at(rect);
        let grid_origin = rect.min + Vec2::new(label_width, 0.0);
        let text_color = ui.visuals().text_color();

        for (i, row) in matrix.values.iter().enumerate() {
            let y = grid_origin.y + i as f32 * cell;
            painter.text(
                egui::pos2(rect.min.x + label_width - 4.0, y + cell / 2.0),
                Align2::RIGHT_CENTER,
                &matrix.columns[i],
                FontId::proportional(cell.min(12.0)),
                text_color,
            );

            for (j, &r) in row.iter().enumerate() {
                let cell_rect = egui::Rect::from_min_size(
                    egui::pos2(grid_origin.x + j as f32 * cell, y),
                    Vec2::splat(cell),
                );
                painter.rect_filled(cell_rect.shrink(0.5), 0.0, diverging_color(r));
                if cell >= 30.0 && !r.is_nan() {
                    let ink = if r.abs() > 0.5 {
                        Color32::WHITE
                    } else {
                        Color32::BLACK
                    };
                    painter.text(
                        cell_rect.center(),
                        Align2::CENTER_CENTER,
                        format!("{:.2}", r),
                        FontId::proportional(9.0),
                        ink,
                    );
                }
            }
        }

        if let Some(pos) = response.hover_pos() {
            let rel = pos - grid_origin;
            if rel.x >= 0.0 && rel.y >= 0.0 {
                let (i, j) = ((rel.y / cell) as usize, (rel.x / cell) as usize);
                if i < n && j < n {
                    let text = format!(
                        "{} vs {}\nCorrelation: {:.3}",
                        matrix.columns[i], matrix.columns[j], matrix.values[i][j]
                    );
                    response.on_hover_text_at_pointer(text);
                }
            }
        }
    }

    /// Draw a striped table of preformatted cells.
    pub fn draw_table(ui: &mut egui::Ui, id: &str, headers: &[&str], rows: &[Vec<String>]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::ScrollArea::horizontal()
                    .id_salt(format!("{}_scroll", id))
                    .show(ui, |ui| {
                        egui::Grid::new(ui.make_persistent_id(id))
                            .striped(true)
                            .min_col_width(55.0)
                            .spacing([12.0, 4.0])
                            .show(ui, |ui| {
                                for header in headers {
                                    ui.label(RichText::new(*header).strong().size(11.0));
                                }
                                ui.end_row();

                                for row in rows {
                                    for cell in row {
                                        ui.label(RichText::new(cell).size(11.0));
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            });
    }
}
