//! Explorer filtering: column selection, price range and table preview.

use crate::data::dataset::{display_value, HousingData};
use polars::prelude::*;

/// Rows shown in the explorer table by default.
pub const DEFAULT_PREVIEW_ROWS: usize = 20;
/// Step of the price range slider, in dollars.
pub const PRICE_STEP: f64 = 10_000.0;

/// Columns to display after validating the user's choice.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSelection {
    pub columns: Vec<String>,
    /// The target had been deselected and was put back in front.
    pub target_reinserted: bool,
}

/// Target plus the first four columns, at most five names.
pub fn default_selection(all: &[String], target: &str) -> Vec<String> {
    let mut selection = vec![target.to_string()];
    selection.extend(all.iter().take(4).cloned());
    selection.retain(|c| all.contains(c));

    let mut unique: Vec<String> = Vec::new();
    for name in selection {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique.truncate(5);
    unique
}

/// Keep known columns in the requested order; the target column is mandatory.
pub fn select_columns(requested: &[String], all: &[String], target: &str) -> ColumnSelection {
    let mut columns: Vec<String> = Vec::new();
    for name in requested {
        if all.contains(name) && !columns.contains(name) {
            columns.push(name.clone());
        }
    }

    let target_reinserted = !columns.iter().any(|c| c == target);
    if target_reinserted {
        columns.insert(0, target.to_string());
    }

    ColumnSelection {
        columns,
        target_reinserted,
    }
}

/// Integer bounds of the target column, for the range slider.
pub fn price_bounds(data: &HousingData) -> Option<(f64, f64)> {
    let prices = data.present_values(data.target());
    let min = prices.iter().copied().reduce(f64::min)?;
    let max = prices.iter().copied().reduce(f64::max)?;
    Some((min.floor(), max.ceil()))
}

/// Rows whose target lies in `[min, max]` (inclusive), projected on `columns`.
/// Rows without a price are excluded.
pub fn filter_by_price(
    df: &DataFrame,
    columns: &[String],
    target: &str,
    min: f64,
    max: f64,
) -> PolarsResult<DataFrame> {
    let price = col(target).cast(DataType::Float64);
    let projection: Vec<Expr> = columns.iter().map(|c| col(c.as_str())).collect();

    df.clone()
        .lazy()
        .filter(price.clone().gt_eq(lit(min)).and(price.lt_eq(lit(max))))
        .select(projection)
        .collect()
}

/// First `n` rows as display strings, one inner vector per row.
pub fn preview_rows(df: &DataFrame, n: usize) -> Vec<Vec<String>> {
    let rows = n.min(df.height());
    (0..rows)
        .map(|i| {
            df.get_columns()
                .iter()
                .map(|col| col.get(i).map(|v| display_value(&v)).unwrap_or_default())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::tests::sample_data;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_selection_puts_target_first() {
        let all = names(&["LotArea", "MSZoning", "Street", "Alley", "Fence", "SalePrice"]);
        assert_eq!(
            default_selection(&all, "SalePrice"),
            names(&["SalePrice", "LotArea", "MSZoning", "Street", "Alley"])
        );
    }

    #[test]
    fn default_selection_does_not_duplicate_target() {
        let all = names(&["SalePrice", "LotArea"]);
        assert_eq!(
            default_selection(&all, "SalePrice"),
            names(&["SalePrice", "LotArea"])
        );
    }

    #[test]
    fn deselected_target_is_reinserted() {
        let all = names(&["LotArea", "MSZoning", "SalePrice"]);
        let selection = select_columns(&names(&["MSZoning", "Bogus"]), &all, "SalePrice");
        assert!(selection.target_reinserted);
        assert_eq!(selection.columns, names(&["SalePrice", "MSZoning"]));

        let selection = select_columns(&names(&["MSZoning", "SalePrice"]), &all, "SalePrice");
        assert!(!selection.target_reinserted);
        assert_eq!(selection.columns, names(&["MSZoning", "SalePrice"]));
    }

    #[test]
    fn price_filter_is_inclusive_and_never_grows() {
        let data = sample_data();
        let columns = names(&["SalePrice", "LotArea"]);
        let (min, max) = (181500.0, 223500.0);

        let filtered =
            filter_by_price(data.frame(), &columns, "SalePrice", min, max).unwrap();

        assert!(filtered.height() <= data.row_count());
        assert_eq!(filtered.height(), 3);
        let prices = filtered.column("SalePrice").unwrap().f64().unwrap();
        for price in prices.into_iter().flatten() {
            assert!((min..=max).contains(&price));
        }
        assert_eq!(filtered.width(), 2);
    }

    #[test]
    fn full_range_keeps_every_priced_row() {
        let data = sample_data();
        let (min, max) = price_bounds(&data).unwrap();
        assert_eq!((min, max), (140000.0, 250000.0));

        let filtered = filter_by_price(
            data.frame(),
            &names(&["SalePrice"]),
            "SalePrice",
            min,
            max,
        )
        .unwrap();
        assert_eq!(filtered.height(), data.row_count());
    }

    #[test]
    fn preview_is_capped_and_renders_missing_as_blank() {
        let data = sample_data();
        let rows = preview_rows(data.frame(), 3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "8450");
        assert_eq!(rows[0][1], "RL");
        assert_eq!(rows[2][1], "");

        assert_eq!(preview_rows(data.frame(), 100).len(), 5);
    }
}
