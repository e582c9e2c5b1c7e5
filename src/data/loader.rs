//! Dataset Loader Module
//! Reads the train/test files with Polars, merges them and normalizes column types.

use crate::config::{AppConfig, DataConfig};
use crate::data::dataset::{is_numeric_dtype, HousingData};
use log::{info, warn};
use polars::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Rows scanned for schema inference.
const INFER_SCHEMA_ROWS: usize = 10_000;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data file not found: {0}")]
    MissingFile(PathBuf),
    #[error("Could not read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Target column '{0}' is missing from the dataset")]
    MissingTarget(String),
}

/// Loads and normalizes the housing dataset.
pub struct DatasetLoader {
    config: DataConfig,
    delimiter: u8,
}

impl DatasetLoader {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.data.clone(),
            delimiter: config.delimiter_byte(),
        }
    }

    /// Read one delimited file. Lines whose field count differs from the header are
    /// skipped with a warning; unparsable fields become nulls.
    pub fn read_table(&self, path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::MissingFile(path.to_path_buf()));
        }

        let text = fs::read_to_string(path).map_err(|e| LoaderError::Io(path.to_path_buf(), e))?;
        let (cleaned, skipped) = drop_ragged_lines(&text, self.delimiter);
        if skipped > 0 {
            warn!(
                "{}: skipped {} malformed line(s) with the wrong number of fields",
                path.display(),
                skipped
            );
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_ignore_errors(true)
            .map_parse_options(|opts| opts.with_separator(self.delimiter))
            .into_reader_with_file_handle(Cursor::new(cleaned.into_bytes()))
            .finish()?;

        info!(
            "Read {} rows, {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );
        Ok(df)
    }

    /// Load train and test, concatenate, drop the identifier and normalize types.
    pub fn load(&self) -> Result<HousingData, LoaderError> {
        let train = self.read_table(&self.config.train_path)?;
        let test = self.read_table(&self.config.test_path)?;

        let merged = merge_frames(&train, &test)?;
        let df = normalize_columns(merged, &self.config.id_column, &self.config.target_column)?;

        info!(
            "Dataset ready: {} rows, {} columns",
            df.height(),
            df.width()
        );
        Ok(HousingData::new(df, self.config.target_column.clone()))
    }
}

/// One logical CSV record and its field count. Quoted delimiters and newlines do not split.
struct Record<'a> {
    text: &'a str,
    fields: usize,
}

fn split_records(text: &str, delimiter: u8) -> Vec<Record<'_>> {
    let delimiter = char::from(delimiter);
    let mut records = Vec::new();
    let mut start = 0;
    let mut fields = 1;
    let mut quoted = false;

    for (i, ch) in text.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            '\n' if !quoted => {
                records.push(Record {
                    text: &text[start..i],
                    fields,
                });
                start = i + 1;
                fields = 1;
            }
            c if c == delimiter && !quoted => fields += 1,
            _ => {}
        }
    }
    if start < text.len() {
        records.push(Record {
            text: &text[start..],
            fields,
        });
    }
    records
}

/// Keep the header and every record with the header's field count.
/// Returns the cleaned text and the number of records dropped. Blank lines are ignored.
fn drop_ragged_lines(text: &str, delimiter: u8) -> (String, usize) {
    let mut records = split_records(text, delimiter)
        .into_iter()
        .filter(|r| !r.text.trim().is_empty());
    let Some(header) = records.next() else {
        return (String::new(), 0);
    };

    let mut cleaned = String::with_capacity(text.len());
    cleaned.push_str(header.text);
    cleaned.push('\n');
    let mut skipped = 0;
    for record in records {
        if record.fields == header.fields {
            cleaned.push_str(record.text);
            cleaned.push('\n');
        } else {
            skipped += 1;
        }
    }
    (cleaned, skipped)
}

/// Common type for a column whose inferred type differs between files.
fn unify_dtype(a: &DataType, b: &DataType) -> DataType {
    if a == b {
        a.clone()
    } else if a == &DataType::Null {
        b.clone()
    } else if b == &DataType::Null {
        a.clone()
    } else if is_numeric_dtype(a) && is_numeric_dtype(b) {
        DataType::Float64
    } else {
        DataType::String
    }
}

/// Reorder and cast a frame to the merged schema, filling absent columns with nulls.
fn align_to_schema(
    df: &DataFrame,
    names: &[String],
    dtypes: &HashMap<String, DataType>,
) -> PolarsResult<DataFrame> {
    let columns = names
        .iter()
        .map(|name| {
            let dtype = dtypes.get(name).cloned().unwrap_or(DataType::Null);
            match df.column(name) {
                Ok(col) if col.dtype() == &dtype => Ok(col.clone()),
                Ok(col) => col.cast(&dtype),
                Err(_) => Ok(Column::full_null(name.as_str().into(), df.height(), &dtype)),
            }
        })
        .collect::<PolarsResult<Vec<_>>>()?;

    DataFrame::new(columns)
}

/// Concatenate two frames by row. Column order follows `first`, then any extra columns of `second`.
pub fn merge_frames(first: &DataFrame, second: &DataFrame) -> PolarsResult<DataFrame> {
    let mut names: Vec<String> = Vec::new();
    let mut dtypes: HashMap<String, DataType> = HashMap::new();

    for df in [first, second] {
        for col in df.get_columns() {
            let name = col.name().to_string();
            match dtypes.get(&name) {
                Some(existing) => {
                    let unified = unify_dtype(existing, col.dtype());
                    dtypes.insert(name, unified);
                }
                None => {
                    dtypes.insert(name.clone(), col.dtype().clone());
                    names.push(name);
                }
            }
        }
    }

    let mut merged = align_to_schema(first, &names, &dtypes)?;
    let second = align_to_schema(second, &names, &dtypes)?;
    merged.vstack_mut(&second)?;
    Ok(merged)
}

/// Drop the identifier column and give every non-numeric column the `String` type.
pub fn normalize_columns(
    df: DataFrame,
    id_column: &str,
    target_column: &str,
) -> Result<DataFrame, LoaderError> {
    let df = if df.column(id_column).is_ok() {
        df.drop(id_column)?
    } else {
        warn!("Identifier column '{}' not found, nothing dropped", id_column);
        df
    };

    let columns = df
        .get_columns()
        .iter()
        .map(|col| {
            let dtype = col.dtype();
            if col.name().as_str() == target_column && !is_numeric_dtype(dtype) {
                // Non-numeric prices become nulls rather than text.
                col.cast(&DataType::Float64)
            } else if is_numeric_dtype(dtype) || dtype == &DataType::String {
                Ok(col.clone())
            } else {
                col.cast(&DataType::String)
            }
        })
        .collect::<PolarsResult<Vec<_>>>()?;

    let df = DataFrame::new(columns)?;
    if df.column(target_column).is_err() {
        return Err(LoaderError::MissingTarget(target_column.to_string()));
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn loader_for(dir: &Path) -> DatasetLoader {
        let mut config = AppConfig::default();
        config.data.train_path = dir.join("train.csv");
        config.data.test_path = dir.join("test.csv");
        DatasetLoader::new(&config)
    }

    const TRAIN: &str = "Id;LotArea;MSZoning;CentralAir;SalePrice\n\
                         1;8450;RL;true;208500\n\
                         2;9600;RL;false;181500\n\
                         3;11250;RM;true;223500\n";
    const TEST: &str = "Id;LotArea;MSZoning;CentralAir;SalePrice\n\
                        4;9550;RL;true;140000\n\
                        5;14260;FV;false;250000\n";

    #[test]
    fn merges_rows_and_drops_identifier() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "train.csv", TRAIN);
        write_file(dir.path(), "test.csv", TEST);

        let data = loader_for(dir.path()).load().unwrap();

        assert_eq!(data.row_count(), 3 + 2);
        assert!(!data.has_column("Id"));
        assert_eq!(
            data.column_names(),
            vec!["LotArea", "MSZoning", "CentralAir", "SalePrice"]
        );
    }

    #[test]
    fn non_numeric_columns_become_strings() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "train.csv", TRAIN);
        write_file(dir.path(), "test.csv", TEST);

        let data = loader_for(dir.path()).load().unwrap();
        let df = data.frame();

        for col in df.get_columns() {
            assert!(
                is_numeric_dtype(col.dtype()) || col.dtype() == &DataType::String,
                "{} has dtype {}",
                col.name(),
                col.dtype()
            );
        }
        assert_eq!(df.column("CentralAir").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("MSZoning").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn columns_missing_from_one_file_are_filled_with_nulls() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "train.csv", "Id;LotArea;SalePrice\n1;8450;208500\n");
        write_file(dir.path(), "test.csv", "Id;LotArea;Street\n2;9600;Pave\n");

        let data = loader_for(dir.path()).load().unwrap();

        assert_eq!(data.row_count(), 2);
        assert_eq!(data.sale_prices(), vec![Some(208500.0), None]);
        assert_eq!(data.text_values("Street"), vec![None, Some("Pave".to_string())]);
    }

    #[test]
    fn mixed_numeric_types_are_unified() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "train.csv", "Id;LotFrontage;SalePrice\n1;65;208500\n");
        write_file(dir.path(), "test.csv", "Id;LotFrontage;SalePrice\n2;80.5;181500\n");

        let data = loader_for(dir.path()).load().unwrap();
        assert_eq!(
            data.frame().column("LotFrontage").unwrap().dtype(),
            &DataType::Float64
        );
        assert_eq!(
            data.numeric_values("LotFrontage"),
            vec![Some(65.0), Some(80.5)]
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "train.csv", TRAIN);

        let err = loader_for(dir.path()).load().unwrap_err();
        assert!(matches!(err, LoaderError::MissingFile(p) if p.ends_with("test.csv")));
    }

    #[test]
    fn missing_target_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "train.csv", "Id;LotArea\n1;8450\n");
        write_file(dir.path(), "test.csv", "Id;LotArea\n2;9600\n");

        let err = loader_for(dir.path()).load().unwrap_err();
        assert!(matches!(err, LoaderError::MissingTarget(t) if t == "SalePrice"));
    }

    #[test]
    fn ragged_line_is_skipped_and_load_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "train.csv",
            "Id;LotArea;SalePrice\n\
             1;8450;208500\n\
             2;9600;181500;EXTRA;MORE\n\
             3;11250;223500\n",
        );
        write_file(dir.path(), "test.csv", TEST);

        let data = loader_for(dir.path()).load().unwrap();

        assert_eq!(data.row_count(), 3 + 2 - 1);
        assert_eq!(data.numeric_values("LotArea")[..2], [Some(8450.0), Some(11250.0)]);
    }

    #[test]
    fn unparsable_price_becomes_null() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "train.csv",
            "Id;LotArea;SalePrice\n1;8450;208500\n2;9600;n/a\n",
        );
        write_file(dir.path(), "test.csv", "Id;LotArea;SalePrice\n3;9550;140000\n");

        let data = loader_for(dir.path()).load().unwrap();

        assert_eq!(data.row_count(), 3);
        assert_eq!(
            data.sale_prices(),
            vec![Some(208500.0), None, Some(140000.0)]
        );
    }

    #[test]
    fn record_split_respects_quotes() {
        let text = "a;b;c\n1;\"x;y\";3\n4;\"multi\nline\";6\n7;8\n\n9;10;11;12\n";
        let (cleaned, skipped) = drop_ragged_lines(text, b';');

        assert_eq!(skipped, 2);
        assert_eq!(cleaned, "a;b;c\n1;\"x;y\";3\n4;\"multi\nline\";6\n");
    }

    #[test]
    fn empty_text_has_no_records() {
        assert_eq!(drop_ragged_lines("", b';'), (String::new(), 0));
    }

    #[test]
    fn unify_prefers_float_for_numbers_and_text_otherwise() {
        assert_eq!(
            unify_dtype(&DataType::Int64, &DataType::Float64),
            DataType::Float64
        );
        assert_eq!(
            unify_dtype(&DataType::Int64, &DataType::String),
            DataType::String
        );
        assert_eq!(unify_dtype(&DataType::Null, &DataType::Int64), DataType::Int64);
        assert_eq!(unify_dtype(&DataType::String, &DataType::String), DataType::String);
    }
}
