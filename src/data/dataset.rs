//! Housing Dataset Module
//! Read-only typed view over the merged train/test DataFrame.

use polars::prelude::*;

/// Whether a polars dtype holds numbers.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Render a cell for display, without the quotes polars puts around strings.
pub fn display_value(value: &AnyValue) -> String {
    if value.is_null() {
        String::new()
    } else {
        value.to_string().trim_matches('"').to_string()
    }
}

/// The merged housing dataset. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct HousingData {
    df: DataFrame,
    target: String,
}

impl HousingData {
    pub fn new(df: DataFrame, target: impl Into<String>) -> Self {
        Self {
            df,
            target: target.into(),
        }
    }

    /// Get a reference to the underlying DataFrame.
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Name of the target column (`SalePrice`).
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn column_count(&self) -> usize {
        self.df.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    /// Get list of numeric column names.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|col| is_numeric_dtype(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Get list of text column names.
    pub fn categorical_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|col| col.dtype() == &DataType::String)
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Values of a column cast to f64. Unknown columns yield an empty vector.
    pub fn numeric_values(&self, column: &str) -> Vec<Option<f64>> {
        let Ok(col) = self.df.column(column) else {
            return Vec::new();
        };

        col.cast(&DataType::Float64)
            .ok()
            .and_then(|casted| {
                casted
                    .f64()
                    .ok()
                    .map(|ca| ca.into_iter().collect::<Vec<_>>())
            })
            .unwrap_or_default()
    }

    /// Non-missing, non-NaN values of a numeric column.
    pub fn present_values(&self, column: &str) -> Vec<f64> {
        self.numeric_values(column)
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect()
    }

    /// Values of a column as text. Numeric columns are rendered.
    pub fn text_values(&self, column: &str) -> Vec<Option<String>> {
        let Ok(col) = self.df.column(column) else {
            return Vec::new();
        };

        let series = col.as_materialized_series();
        if let Ok(ca) = series.str() {
            return ca.into_iter().map(|v| v.map(str::to_string)).collect();
        }

        (0..series.len())
            .map(|i| {
                series
                    .get(i)
                    .ok()
                    .filter(|v| !v.is_null())
                    .map(|v| display_value(&v))
            })
            .collect()
    }

    /// Target values, one per row.
    pub fn sale_prices(&self) -> Vec<Option<f64>> {
        self.numeric_values(&self.target)
    }

    pub fn null_count(&self, column: &str) -> usize {
        self.df
            .column(column)
            .map(|col| col.null_count())
            .unwrap_or(0)
    }

    /// Short type label for the type-distribution chart.
    pub fn dtype_label(&self, column: &str) -> String {
        self.df
            .column(column)
            .map(|col| match col.dtype() {
                DataType::Float32 | DataType::Float64 => "float".to_string(),
                DataType::String => "text".to_string(),
                dtype if is_numeric_dtype(dtype) => "integer".to_string(),
                other => other.to_string(),
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_data() -> HousingData {
        let df = DataFrame::new(vec![
            Column::new("LotArea".into(), vec![8450i64, 9600, 11250, 9550, 14260]),
            Column::new(
                "MSZoning".into(),
                vec![Some("RL"), Some("RL"), None, Some("RM"), Some("RL")],
            ),
            Column::new(
                "GarageYrBlt".into(),
                vec![Some(2003.0), None, Some(2001.0), Some(1998.0), Some(2000.0)],
            ),
            Column::new(
                "SalePrice".into(),
                vec![208500.0, 181500.0, 223500.0, 140000.0, 250000.0],
            ),
        ])
        .unwrap();
        HousingData::new(df, "SalePrice")
    }

    #[test]
    fn splits_numeric_and_text_columns() {
        let data = sample_data();
        assert_eq!(
            data.numeric_columns(),
            vec!["LotArea", "GarageYrBlt", "SalePrice"]
        );
        assert_eq!(data.categorical_columns(), vec!["MSZoning"]);
        assert_eq!(data.row_count(), 5);
        assert_eq!(data.column_count(), 4);
    }

    #[test]
    fn numeric_values_keep_missing_as_none() {
        let data = sample_data();
        let values = data.numeric_values("GarageYrBlt");
        assert_eq!(values.len(), 5);
        assert_eq!(values[1], None);
        assert_eq!(data.present_values("GarageYrBlt").len(), 4);
        assert!(data.numeric_values("Nope").is_empty());
    }

    #[test]
    fn text_values_render_both_kinds() {
        let data = sample_data();
        let zoning = data.text_values("MSZoning");
        assert_eq!(zoning[0].as_deref(), Some("RL"));
        assert_eq!(zoning[2], None);

        let lot = data.text_values("LotArea");
        assert_eq!(lot[0].as_deref(), Some("8450"));
    }

    #[test]
    fn dtype_labels() {
        let data = sample_data();
        assert_eq!(data.dtype_label("LotArea"), "integer");
        assert_eq!(data.dtype_label("SalePrice"), "float");
        assert_eq!(data.dtype_label("MSZoning"), "text");
        assert_eq!(data.null_count("MSZoning"), 1);
    }
}
