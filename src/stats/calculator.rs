//! Statistics Calculator Module
//! Descriptive statistics, skewness, correlation and simple regression on plain slices.

use std::cmp::Ordering;

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
    /// Coefficient of variation in percent, rounded to 2 decimals.
    pub cv: f64,
}

impl Default for Describe {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
            cv: f64::NAN,
        }
    }
}

/// Handles statistical calculations on value slices.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Sorted copy with NaNs removed.
    pub fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        sorted
    }

    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Sample standard deviation (n - 1).
    pub fn std(values: &[f64]) -> f64 {
        let n = values.len();
        if n < 2 {
            return f64::NAN;
        }
        let mean = Self::mean(values);
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    }

    /// Compute descriptive statistics for an array of values.
    pub fn describe(values: &[f64]) -> Describe {
        let sorted = Self::sorted(values);
        let n = sorted.len();
        if n == 0 {
            return Describe::default();
        }

        let mean = Self::mean(&sorted);
        let std = Self::std(&sorted);
        let cv = if mean != 0.0 && !std.is_nan() {
            (std / mean * 100.0 * 100.0).round() / 100.0
        } else {
            f64::NAN
        };

        Describe {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
            cv,
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Adjusted Fisher-Pearson skewness (same estimator as pandas).
    pub fn skewness(values: &[f64]) -> f64 {
        let clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let n = clean.len();
        if n < 3 {
            return f64::NAN;
        }

        let nf = n as f64;
        let mean = Self::mean(&clean);
        let m2 = clean.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / nf;
        let m3 = clean.iter().map(|x| (x - mean).powi(3)).sum::<f64>() / nf;
        if m2 == 0.0 {
            return 0.0;
        }

        let g1 = m3 / m2.powf(1.5);
        g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0)
    }

    /// Skewness of the raw, log1p and square-root transformed values.
    pub fn transform_skews(values: &[f64]) -> [(&'static str, f64); 3] {
        let log: Vec<f64> = values.iter().map(|v| v.ln_1p()).collect();
        let sqrt: Vec<f64> = values.iter().map(|v| v.sqrt()).collect();
        [
            ("Original", Self::skewness(values)),
            ("Log(x+1)", Self::skewness(&log)),
            ("Square root", Self::skewness(&sqrt)),
        ]
    }

    /// Pairs where both sides are present.
    pub fn complete_pairs(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
        x.iter()
            .zip(y.iter())
            .filter_map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => Some((*a, *b)),
                _ => None,
            })
            .unzip()
    }

    /// Pearson correlation over complete pairs.
    pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
        let (xs, ys) = Self::complete_pairs(x, y);
        Self::pearson_complete(&xs, &ys)
    }

    pub fn pearson_complete(xs: &[f64], ys: &[f64]) -> f64 {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return f64::NAN;
        }

        let mx = Self::mean(&xs[..n]);
        let my = Self::mean(&ys[..n]);
        let mut sxy = 0.0;
        let mut sxx = 0.0;
        let mut syy = 0.0;
        for i in 0..n {
            let dx = xs[i] - mx;
            let dy = ys[i] - my;
            sxy += dx * dy;
            sxx += dx * dx;
            syy += dy * dy;
        }

        if sxx == 0.0 || syy == 0.0 {
            return f64::NAN;
        }
        (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
    }

    /// Ordinary least squares fit `y = slope * x + intercept`.
    pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return None;
        }

        let mx = Self::mean(&xs[..n]);
        let my = Self::mean(&ys[..n]);
        let sxx: f64 = xs[..n].iter().map(|x| (x - mx).powi(2)).sum();
        if sxx == 0.0 {
            return None;
        }
        let sxy: f64 = xs[..n]
            .iter()
            .zip(ys[..n].iter())
            .map(|(x, y)| (x - mx) * (y - my))
            .sum();

        let slope = sxy / sxx;
        Some((slope, my - slope * mx))
    }

    /// Outlier threshold `Q3 + 1.5 * IQR`.
    pub fn iqr_upper_bound(values: &[f64]) -> f64 {
        let sorted = Self::sorted(values);
        let q1 = Self::percentile(&sorted, 25.0);
        let q3 = Self::percentile(&sorted, 75.0);
        q3 + 1.5 * (q3 - q1)
    }

    /// Verbal label for the magnitude of a correlation.
    pub fn correlation_strength(r: f64) -> &'static str {
        let r = r.abs();
        if r >= 0.8 {
            "Very strong"
        } else if r >= 0.6 {
            "Strong"
        } else if r >= 0.4 {
            "Moderate"
        } else if r >= 0.2 {
            "Weak"
        } else {
            "Very weak"
        }
    }

    /// Number of distinct non-NaN values.
    pub fn distinct_count(values: &[f64]) -> usize {
        let sorted = Self::sorted(values);
        let mut count = 0;
        let mut last: Option<f64> = None;
        for v in sorted {
            if last != Some(v) {
                count += 1;
                last = Some(v);
            }
        }
        count
    }

    /// True when the distinct values are exactly {0, 1}.
    pub fn is_binary(values: &[f64]) -> bool {
        let has_zero = values.iter().any(|&v| v == 0.0);
        let has_one = values.iter().any(|&v| v == 1.0);
        has_zero && has_one && values.iter().all(|&v| v == 0.0 || v == 1.0 || v.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn describe_matches_numpy_quantiles() {
        let d = StatsCalculator::describe(&[1.0, 2.0, 3.0, 4.0, f64::NAN]);
        assert_eq!(d.count, 4);
        assert_eq!(d.mean, 2.5);
        assert!(close(d.std, 1.2909944, 1e-6));
        assert_eq!(d.min, 1.0);
        assert_eq!(d.q25, 1.75);
        assert_eq!(d.median, 2.5);
        assert_eq!(d.q75, 3.25);
        assert_eq!(d.max, 4.0);
        assert_eq!(d.cv, 51.64);
    }

    #[test]
    fn describe_empty_is_nan() {
        let d = StatsCalculator::describe(&[]);
        assert_eq!(d.count, 0);
        assert!(d.mean.is_nan());
    }

    #[test]
    fn skewness_matches_pandas() {
        // pandas.Series([1, 2, 3, 10]).skew() == 1.7636326...
        let s = StatsCalculator::skewness(&[1.0, 2.0, 3.0, 10.0]);
        assert!(close(s, 1.763_632_6, 1e-6), "{}", s);
        assert_eq!(StatsCalculator::skewness(&[5.0, 5.0, 5.0]), 0.0);
        assert!(StatsCalculator::skewness(&[1.0, 2.0]).is_nan());
    }

    #[test]
    fn log_transform_reduces_right_skew() {
        let prices = [
            100_000.0, 120_000.0, 130_000.0, 150_000.0, 180_000.0, 250_000.0, 600_000.0,
        ];
        let skews = StatsCalculator::transform_skews(&prices);
        assert_eq!(skews[0].0, "Original");
        assert!(skews[1].1.abs() < skews[0].1.abs());
        assert!(skews[2].1.abs() < skews[0].1.abs());
    }

    #[test]
    fn expm1_inverts_log1p() {
        for x in [0.0, 1e-9, 0.5, 1.0, 42.0, 208_500.0, 755_000.0, 1e12] {
            let back = f64::exp_m1(f64::ln_1p(x));
            assert!(close(back, x, 1e-9 * x.max(1.0)), "{} -> {}", x, back);
        }
    }

    #[test]
    fn pearson_skips_incomplete_pairs() {
        let x = [Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)];
        let y = [Some(2.0), Some(4.0), Some(100.0), Some(6.0), Some(8.0)];
        assert!(close(StatsCalculator::pearson(&x, &y), 1.0, 1e-12));

        let neg = [Some(8.0), Some(6.0), Some(0.0), Some(4.0), Some(2.0)];
        assert!(close(StatsCalculator::pearson(&x, &neg), -1.0, 1e-12));

        let flat = [Some(1.0); 5];
        assert!(StatsCalculator::pearson(&x, &flat).is_nan());
    }

    #[test]
    fn linear_fit_recovers_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let (slope, intercept) = StatsCalculator::linear_fit(&xs, &ys).unwrap();
        assert!(close(slope, 2.0, 1e-12));
        assert!(close(intercept, 1.0, 1e-12));
        assert!(StatsCalculator::linear_fit(&[1.0, 1.0], &[2.0, 3.0]).is_none());
    }

    #[test]
    fn iqr_bound() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        // Q1 = 2, Q3 = 4
        assert_eq!(StatsCalculator::iqr_upper_bound(&values), 7.0);
    }

    #[test]
    fn strength_labels() {
        assert_eq!(StatsCalculator::correlation_strength(0.85), "Very strong");
        assert_eq!(StatsCalculator::correlation_strength(-0.65), "Strong");
        assert_eq!(StatsCalculator::correlation_strength(0.4), "Moderate");
        assert_eq!(StatsCalculator::correlation_strength(0.2), "Weak");
        assert_eq!(StatsCalculator::correlation_strength(0.05), "Very weak");
    }

    #[test]
    fn distinct_and_binary() {
        assert_eq!(StatsCalculator::distinct_count(&[1.0, 1.0, 2.0, f64::NAN]), 2);
        assert!(StatsCalculator::is_binary(&[0.0, 1.0, 1.0]));
        assert!(!StatsCalculator::is_binary(&[0.0, 0.0]));
        assert!(!StatsCalculator::is_binary(&[0.0, 1.0, 2.0]));
    }
}
