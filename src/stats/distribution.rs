//! Distribution helpers: histograms, kernel density, normal curves and QQ points.

use crate::stats::StatsCalculator;
use rayon::prelude::*;
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// One equal-width histogram bin.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// `n` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Equal-width histogram. The last bin is closed on the right.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let sorted = StatsCalculator::sorted(values);
    if sorted.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    if min == max {
        return vec![HistogramBin {
            start: min - 0.5,
            end: max + 0.5,
            count: sorted.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &sorted {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Bin heights normalized so the histogram integrates to one.
pub fn density_heights(bins: &[HistogramBin]) -> Vec<f64> {
    let total: usize = bins.iter().map(|b| b.count).sum();
    if total == 0 {
        return vec![0.0; bins.len()];
    }
    bins.iter()
        .map(|b| b.count as f64 / (total as f64 * b.width()))
        .collect()
}

/// Gaussian kernel density estimate on `grid`, bandwidth by Scott's rule.
pub fn gaussian_kde(values: &[f64], grid: &[f64]) -> Vec<f64> {
    let clean = StatsCalculator::sorted(values);
    let n = clean.len();
    let std = StatsCalculator::std(&clean);
    if n < 2 || !(std > 0.0) {
        return vec![0.0; grid.len()];
    }

    let bandwidth = std * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    grid.par_iter()
        .map(|&x| {
            let sum: f64 = clean
                .iter()
                .map(|&xi| {
                    let u = (x - xi) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum();
            sum * norm
        })
        .collect()
}

/// Normal density with the sample mean and standard deviation, evaluated on `grid`.
pub fn normal_pdf_curve(values: &[f64], grid: &[f64]) -> Vec<f64> {
    let clean = StatsCalculator::sorted(values);
    let mean = StatsCalculator::mean(&clean);
    let std = StatsCalculator::std(&clean);

    match Normal::new(mean, std) {
        Ok(dist) => grid.iter().map(|&x| dist.pdf(x)).collect(),
        Err(_) => vec![0.0; grid.len()],
    }
}

/// QQ points: standard-normal quantiles of `linspace(0.01, 0.99, n)` against sorted samples.
pub fn normal_qq(values: &[f64]) -> Vec<[f64; 2]> {
    let sorted = StatsCalculator::sorted(values);
    let Ok(standard) = Normal::new(0.0, 1.0) else {
        return Vec::new();
    };

    linspace(0.01, 0.99, sorted.len())
        .into_iter()
        .zip(sorted)
        .map(|(p, v)| [standard.inverse_cdf(p), v])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_both_ends() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|v| v as f64).collect();
        let bins = histogram(&values, 10);
        assert_eq!(bins.len(), 10);
        assert!(bins.iter().all(|b| b.count == 10));
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[9].end, 99.0);
    }

    #[test]
    fn histogram_of_constant_values() {
        let bins = histogram(&[5.0, 5.0, 5.0], 50);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
        assert_eq!(bins[0].center(), 5.0);
    }

    #[test]
    fn density_integrates_to_one() {
        let values: Vec<f64> = (0..1000).map(|v| (v as f64).sqrt()).collect();
        let bins = histogram(&values, 30);
        let area: f64 = density_heights(&bins)
            .iter()
            .zip(bins.iter())
            .map(|(h, b)| h * b.width())
            .sum();
        assert!((area - 1.0).abs() < 1e-9);
    }

    #[test]
    fn kde_is_a_density() {
        let values: Vec<f64> = (0..200).map(|v| (v % 17) as f64).collect();
        let grid = linspace(-20.0, 40.0, 601);
        let density = gaussian_kde(&values, &grid);
        let step = grid[1] - grid[0];
        let area: f64 = density.iter().sum::<f64>() * step;
        assert!((area - 1.0).abs() < 1e-3, "area {}", area);
        assert!(density.iter().all(|d| *d >= 0.0));
    }

    #[test]
    fn kde_of_constant_values_is_flat_zero() {
        let density = gaussian_kde(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]);
        assert_eq!(density, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn normal_curve_peaks_at_mean() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let curve = normal_pdf_curve(&values, &[1.0, 3.0, 5.0]);
        assert!(curve[1] > curve[0]);
        assert!((curve[0] - curve[2]).abs() < 1e-12);
    }

    #[test]
    fn qq_points_are_symmetric_and_sorted() {
        let points = normal_qq(&[3.0, 1.0, 2.0]);
        assert_eq!(points.len(), 3);
        assert!((points[0][0] + points[2][0]).abs() < 1e-9);
        assert!(points[1][0].abs() < 1e-9);
        assert_eq!(points[0][1], 1.0);
        assert_eq!(points[2][1], 3.0);
        // Φ⁻¹(0.01)
        assert!((points[0][0] + 2.326_347_874).abs() < 1e-6);
    }
}
