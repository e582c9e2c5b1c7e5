//! Dataset-level summaries: per-column statistics, missing values, correlations and groupings.

use crate::data::HousingData;
use crate::stats::{Describe, StatsCalculator};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Numeric columns need more distinct values than this to enter the correlation views.
pub const CORRELATION_MIN_UNIQUE: usize = 10;
/// Text columns summarized on the explorer.
pub const CATEGORICAL_SUMMARY_LIMIT: usize = 5;
/// Entries in the top/bottom correlation charts.
pub const TOP_CORRELATIONS: usize = 10;

#[derive(Debug, Clone)]
pub struct NumericSummary {
    pub column: String,
    pub stats: Describe,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub column: String,
    pub categories: usize,
    pub mode: String,
    pub mode_count: usize,
    /// Mode frequency relative to all rows, in percent.
    pub mode_share: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissingValue {
    pub column: String,
    pub count: usize,
    /// `count / rows * 100`, always in [0, 100].
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DtypeShare {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

/// Target statistics for one group (category or year).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStat<K> {
    pub key: K,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

/// Strongest positive and negative correlations with the target.
#[derive(Debug, Clone, Default)]
pub struct TargetCorrelations {
    pub positive: Vec<(String, f64)>,
    pub negative: Vec<(String, f64)>,
}

/// Handles whole-dataset summaries, parallelized per column.
pub struct DatasetSummary;

impl DatasetSummary {
    /// `describe` for every numeric column, in column order.
    pub fn describe_numeric(data: &HousingData) -> Vec<NumericSummary> {
        data.numeric_columns()
            .par_iter()
            .map(|column| NumericSummary {
                column: column.clone(),
                stats: StatsCalculator::describe(&data.present_values(column)),
            })
            .collect()
    }

    /// Category count and mode for the first `limit` text columns.
    pub fn categorical_summary(data: &HousingData, limit: usize) -> Vec<CategoricalSummary> {
        let rows = data.row_count();
        data.categorical_columns()
            .into_iter()
            .take(limit)
            .map(|column| {
                let counts = Self::value_counts(&data.text_values(&column), usize::MAX);
                let (mode, mode_count) = counts
                    .first()
                    .cloned()
                    .unwrap_or_else(|| ("N/A".to_string(), 0));
                let mode_share = if rows > 0 {
                    mode_count as f64 / rows as f64 * 100.0
                } else {
                    0.0
                };
                CategoricalSummary {
                    column,
                    categories: counts.len(),
                    mode,
                    mode_count,
                    mode_share,
                }
            })
            .collect()
    }

    /// Missing count and percentage per column, most incomplete first.
    pub fn missing_values(data: &HousingData) -> Vec<MissingValue> {
        let rows = data.row_count();
        let mut missing: Vec<MissingValue> = data
            .column_names()
            .into_iter()
            .map(|column| {
                let count = data.null_count(&column);
                let percent = if rows > 0 {
                    count as f64 / rows as f64 * 100.0
                } else {
                    0.0
                };
                MissingValue {
                    column,
                    count,
                    percent,
                }
            })
            .collect();

        missing.sort_by(|a, b| b.count.cmp(&a.count));
        missing
    }

    /// Total missing cells and their share of all cells, in percent.
    pub fn total_missing(data: &HousingData) -> (usize, f64) {
        let total: usize = data
            .column_names()
            .iter()
            .map(|c| data.null_count(c))
            .sum();
        let cells = data.row_count() * data.column_count();
        let percent = if cells > 0 {
            total as f64 / cells as f64 * 100.0
        } else {
            0.0
        };
        (total, percent)
    }

    /// Number and share of columns per type label, most common first.
    pub fn dtype_distribution(data: &HousingData) -> Vec<DtypeShare> {
        let columns = data.column_names();
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for column in &columns {
            *counts.entry(data.dtype_label(column)).or_default() += 1;
        }

        let total = columns.len().max(1) as f64;
        let mut shares: Vec<DtypeShare> = counts
            .into_iter()
            .map(|(label, count)| DtypeShare {
                label,
                count,
                percent: (count as f64 / total * 1000.0).round() / 10.0,
            })
            .collect();
        shares.sort_by(|a, b| b.count.cmp(&a.count));
        shares
    }

    /// Most frequent values, ties broken alphabetically. Missing values are not counted.
    pub fn value_counts(values: &[Option<String>], limit: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for v in values.iter().flatten() {
            *counts.entry(v.as_str()).or_default() += 1;
        }

        let mut sorted: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sorted.truncate(limit);
        sorted
    }

    /// Numeric columns other than the target whose values are not just {0, 1}.
    pub fn continuous_columns(data: &HousingData) -> Vec<String> {
        data.numeric_columns()
            .into_iter()
            .filter(|c| c != data.target())
            .filter(|c| !StatsCalculator::is_binary(&data.present_values(c)))
            .collect()
    }

    /// Numeric columns with more than `min_unique` distinct values.
    pub fn high_cardinality_columns(data: &HousingData, min_unique: usize) -> Vec<String> {
        data.numeric_columns()
            .into_iter()
            .filter(|c| StatsCalculator::distinct_count(&data.present_values(c)) > min_unique)
            .collect()
    }

    /// Pairwise Pearson correlations, one row per column computed in parallel.
    pub fn correlation_matrix(data: &HousingData, columns: &[String]) -> CorrelationMatrix {
        let values: Vec<Vec<Option<f64>>> =
            columns.iter().map(|c| data.numeric_values(c)).collect();

        let matrix = (0..columns.len())
            .into_par_iter()
            .map(|i| {
                (0..columns.len())
                    .map(|j| {
                        if i == j {
                            1.0
                        } else {
                            StatsCalculator::pearson(&values[i], &values[j])
                        }
                    })
                    .collect::<Vec<f64>>()
            })
            .collect();

        CorrelationMatrix {
            columns: columns.to_vec(),
            values: matrix,
        }
    }

    /// Top positive and bottom negative correlations with `target`, both in descending order.
    pub fn target_correlations(matrix: &CorrelationMatrix, target: &str) -> TargetCorrelations {
        let Some(t) = matrix.index_of(target) else {
            return TargetCorrelations::default();
        };

        let mut ranked: Vec<(String, f64)> = matrix
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != t)
            .map(|(i, c)| (c.clone(), matrix.values[t][i]))
            .filter(|(_, r)| !r.is_nan())
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let positive = ranked.iter().take(TOP_CORRELATIONS).cloned().collect();
        let skip = ranked.len().saturating_sub(TOP_CORRELATIONS);
        let negative = ranked.iter().skip(skip).cloned().collect();

        TargetCorrelations { positive, negative }
    }

    /// Count, mean, median and std of values per key, ordered by key.
    pub fn group_stats<K, I>(pairs: I) -> Vec<GroupStat<K>>
    where
        K: Ord + Clone,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
        for (key, value) in pairs {
            if !value.is_nan() {
                groups.entry(key).or_default().push(value);
            }
        }

        groups
            .into_iter()
            .map(|(key, values)| {
                let sorted = StatsCalculator::sorted(&values);
                GroupStat {
                    key,
                    count: sorted.len(),
                    mean: StatsCalculator::mean(&sorted),
                    median: StatsCalculator::percentile(&sorted, 50.0),
                    std: StatsCalculator::std(&sorted),
                }
            })
            .collect()
    }

    /// Target statistics per category of a text column.
    pub fn target_by_category(data: &HousingData, column: &str) -> Vec<GroupStat<String>> {
        let keys = data.text_values(column);
        let prices = data.sale_prices();
        Self::group_stats(
            keys.into_iter()
                .zip(prices)
                .filter_map(|(k, p)| Some((k?, p?))),
        )
    }

    /// Target statistics per integer value of a numeric column (years, months).
    pub fn target_by_period(data: &HousingData, column: &str) -> Vec<GroupStat<i64>> {
        let keys = data.numeric_values(column);
        let prices = data.sale_prices();
        Self::group_stats(
            keys.into_iter()
                .zip(prices)
                .filter_map(|(k, p)| match (k, p) {
                    (Some(k), Some(p)) if !k.is_nan() => Some((k.round() as i64, p)),
                    _ => None,
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::tests::sample_data;

    #[test]
    fn missing_percentages_are_consistent() {
        let data = sample_data();
        let missing = DatasetSummary::missing_values(&data);

        assert_eq!(missing.len(), data.column_count());
        for m in &missing {
            assert!((0.0..=100.0).contains(&m.percent));
            let expected = m.count as f64 / data.row_count() as f64 * 100.0;
            assert!((m.percent - expected).abs() < 1e-12);
        }
        assert_eq!(missing[0].count, 1);
        assert_eq!(missing[0].percent, 20.0);

        let (total, share) = DatasetSummary::total_missing(&data);
        assert_eq!(total, 2);
        assert_eq!(share, 10.0);
    }

    #[test]
    fn describes_every_numeric_column() {
        let data = sample_data();
        let summary = DatasetSummary::describe_numeric(&data);
        let columns: Vec<&str> = summary.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(columns, vec!["LotArea", "GarageYrBlt", "SalePrice"]);
        assert_eq!(summary[1].stats.count, 4);
        assert_eq!(summary[2].stats.mean, 200700.0);
    }

    #[test]
    fn categorical_mode_and_share() {
        let data = sample_data();
        let summary = DatasetSummary::categorical_summary(&data, CATEGORICAL_SUMMARY_LIMIT);
        assert_eq!(
            summary,
            vec![CategoricalSummary {
                column: "MSZoning".into(),
                categories: 2,
                mode: "RL".into(),
                mode_count: 3,
                mode_share: 60.0,
            }]
        );
    }

    #[test]
    fn value_counts_order_and_limit() {
        let values: Vec<Option<String>> = ["b", "a", "b", "c", "a", "b"]
            .iter()
            .map(|s| Some(s.to_string()))
            .chain(std::iter::once(None))
            .collect();
        let counts = DatasetSummary::value_counts(&values, 2);
        assert_eq!(counts, vec![("b".to_string(), 3), ("a".to_string(), 2)]);
    }

    #[test]
    fn dtype_shares_sum_to_column_count() {
        let data = sample_data();
        let shares = DatasetSummary::dtype_distribution(&data);
        let total: usize = shares.iter().map(|s| s.count).sum();
        assert_eq!(total, data.column_count());
        assert_eq!(shares[0].label, "float");
        assert_eq!(shares[0].percent, 50.0);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let data = sample_data();
        let columns = data.numeric_columns();
        let matrix = DatasetSummary::correlation_matrix(&data, &columns);

        for i in 0..columns.len() {
            assert_eq!(matrix.values[i][i], 1.0);
            for j in 0..columns.len() {
                let (a, b) = (matrix.values[i][j], matrix.values[j][i]);
                assert!((a - b).abs() < 1e-12 || (a.is_nan() && b.is_nan()));
            }
        }
        let (a, b) = (matrix.index_of("LotArea").unwrap(), matrix.index_of("SalePrice").unwrap());
        assert!(!matrix.values[a][b].is_nan());
        assert_eq!(matrix.index_of("MSZoning"), None);
    }

    #[test]
    fn target_correlations_exclude_target() {
        let matrix = CorrelationMatrix {
            columns: vec!["A".into(), "SalePrice".into(), "B".into(), "C".into()],
            values: vec![
                vec![1.0, 0.5, 0.0, 0.0],
                vec![0.5, 1.0, -0.3, 0.9],
                vec![0.0, -0.3, 1.0, 0.0],
                vec![0.0, 0.9, 0.0, 1.0],
            ],
        };
        let top = DatasetSummary::target_correlations(&matrix, "SalePrice");
        let names: Vec<&str> = top.positive.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        assert_eq!(top.negative.last().unwrap().0, "B");
    }

    #[test]
    fn groups_are_ordered_by_key() {
        let stats = DatasetSummary::group_stats(vec![
            (2008i64, 10.0),
            (2006, 1.0),
            (2006, 3.0),
            (2008, f64::NAN),
        ]);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].key, 2006);
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].mean, 2.0);
        assert_eq!(stats[0].median, 2.0);
        assert_eq!(stats[1].count, 1);
        assert!(stats[1].std.is_nan());
    }

    #[test]
    fn target_by_category_skips_missing_keys() {
        let data = sample_data();
        let groups = DatasetSummary::target_by_category(&data, "MSZoning");
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["RL", "RM"]);
        assert_eq!(groups[0].count, 3);
    }

    #[test]
    fn continuous_columns_drop_target() {
        let data = sample_data();
        let columns = DatasetSummary::continuous_columns(&data);
        assert_eq!(columns, vec!["LotArea", "GarageYrBlt"]);
    }
}
