//! Export Module
//! CSV downloads via Polars and a minimal XLSX workbook written as a ZIP of XML parts.

use crate::data::dataset::{display_value, is_numeric_dtype};
use log::info;
use polars::prelude::*;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use thiserror::Error;
use ::zip::write::FileOptions;
use ::zip::ZipWriter;

pub const FULL_CSV_NAME: &str = "housing_dataset_full.csv";
pub const FILTERED_CSV_NAME: &str = "housing_dataset_filtered.csv";
pub const REPORT_XLSX_NAME: &str = "housing_analysis_report.xlsx";
pub const ESTIMATE_CSV_NAME: &str = "price_estimate.csv";

/// Excel limit on worksheet names.
const MAX_SHEET_NAME: usize = 31;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Archive error: {0}")]
    Zip(#[from] ::zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Workbook needs at least one sheet")]
    NoSheets,
}

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            Cell::Number(v)
        } else {
            Cell::Empty
        }
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

/// A named table written as one worksheet.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: sanitize_sheet_name(name),
            headers,
            rows,
        }
    }

    /// Build a sheet from a DataFrame, keeping numbers numeric.
    pub fn from_frame(name: &str, df: &DataFrame) -> Self {
        let headers = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let columns: Vec<Vec<Cell>> = df
            .get_columns()
            .iter()
            .map(|col| {
                if is_numeric_dtype(col.dtype()) {
                    col.cast(&DataType::Float64)
                        .ok()
                        .and_then(|c| {
                            c.f64().ok().map(|ca| {
                                ca.into_iter()
                                    .map(|v| v.map(Cell::from).unwrap_or(Cell::Empty))
                                    .collect()
                            })
                        })
                        .unwrap_or_default()
                } else {
                    (0..col.len())
                        .map(|i| match col.get(i) {
                            Ok(v) if !v.is_null() => Cell::Text(display_value(&v)),
                            _ => Cell::Empty,
                        })
                        .collect()
                }
            })
            .collect();

        let rows = (0..df.height())
            .map(|i| {
                columns
                    .iter()
                    .map(|c| c.get(i).cloned().unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();

        Self::new(name, headers, rows)
    }
}

/// Serialize a DataFrame as comma-delimited text with a header row.
pub fn to_csv_bytes(df: &DataFrame) -> Result<Vec<u8>, ExportError> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut df = df.clone();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)?;
    Ok(buffer)
}

/// Two-column text table (e.g. the prediction report) as CSV.
pub fn table_to_csv_bytes(headers: [&str; 2], rows: &[(String, String)]) -> Result<Vec<u8>, ExportError> {
    let df = DataFrame::new(vec![
        Column::new(
            headers[0].into(),
            rows.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            headers[1].into(),
            rows.iter().map(|(_, v)| v.as_str()).collect::<Vec<_>>(),
        ),
    ])?;
    to_csv_bytes(&df)
}

/// Build an XLSX workbook in memory, one worksheet per sheet.
pub fn to_xlsx_bytes(sheets: &[Sheet]) -> Result<Vec<u8>, ExportError> {
    if sheets.is_empty() {
        return Err(ExportError::NoSheets);
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types_xml(sheets.len()).as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS_XML.as_bytes())?;

    zip.start_file("docProps/app.xml", options)?;
    zip.write_all(APP_PROPS_XML.as_bytes())?;

    zip.start_file("docProps/core.xml", options)?;
    zip.write_all(CORE_PROPS_XML.as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(workbook_xml(sheets).as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(workbook_rels_xml(sheets.len()).as_bytes())?;

    zip.start_file("xl/styles.xml", options)?;
    zip.write_all(STYLES_XML.as_bytes())?;

    for (idx, sheet) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", idx + 1), options)?;
        zip.write_all(sheet_xml(sheet).as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Write export bytes to the path chosen in the save dialog.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    fs::write(path, bytes)?;
    info!("Exported {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();

    if cleaned.trim().is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA.
pub fn column_letter(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (idx % 26) as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if (c as u32) < 0x20 && c != '\t' && c != '\n' && c != '\r' => {}
            c => out.push(c),
        }
    }
    out
}

fn cell_xml(reference: &str, cell: &Cell) -> String {
    match cell {
        Cell::Number(v) => format!(r#"<c r="{}"><v>{}</v></c>"#, reference, v),
        Cell::Text(s) => format!(
            r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            reference,
            escape_xml(s)
        ),
        Cell::Empty => String::new(),
    }
}

fn sheet_xml(sheet: &Sheet) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    let header_cells: Vec<Cell> = sheet.headers.iter().map(|h| Cell::from(h.as_str())).collect();
    let all_rows = std::iter::once(&header_cells).chain(sheet.rows.iter());

    for (row_idx, row) in all_rows.enumerate() {
        let row_num = row_idx + 1;
        xml.push_str(&format!(r#"<row r="{}">"#, row_num));
        for (col_idx, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letter(col_idx), row_num);
            xml.push_str(&cell_xml(&reference, cell));
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn content_types_xml(sheet_count: usize) -> String {
    let overrides: String = (1..=sheet_count)
        .map(|i| {
            format!(
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
{}
</Types>"#,
        overrides
    )
}

fn workbook_xml(sheets: &[Sheet]) -> String {
    let entries: String = sheets
        .iter()
        .enumerate()
        .map(|(idx, sheet)| {
            format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(&sheet.name),
                idx + 1,
                idx + 1
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>{}</sheets>
</workbook>"#,
        entries
    )
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut rels: String = (1..=sheet_count)
        .map(|i| {
            format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i, i
            )
        })
        .collect();
    rels.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheet_count + 1
    ));

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        rels
    )
}

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;

const APP_PROPS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
<Application>HousePredict</Application>
</Properties>"#;

const CORE_PROPS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">
<dc:title>Housing Analysis Report</dc:title>
<dc:creator>HousePredict</dc:creator>
</cp:coreProperties>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
</styleSheet>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::tests::sample_data;
    use std::io::Read;
    use ::zip::ZipArchive;

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let data = sample_data();
        let bytes = to_csv_bytes(data.frame()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "LotArea,MSZoning,GarageYrBlt,SalePrice");
        assert_eq!(lines.len(), 1 + data.row_count());
    }

    #[test]
    fn report_table_csv() {
        let rows = vec![
            ("Lot area".to_string(), "300 sq ft".to_string()),
            ("Estimated price".to_string(), "$181,000".to_string()),
        ];
        let bytes = table_to_csv_bytes(["Characteristic", "Value"], &rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("Characteristic,Value\n"));
        assert!(text.contains("\"$181,000\""));
    }

    #[test]
    fn workbook_contains_one_part_per_sheet() {
        let data = sample_data();
        let sheets = vec![
            Sheet::from_frame("Raw Data", data.frame()),
            Sheet::from_frame("Filtered Data", data.frame()),
            Sheet::new(
                "Statistics",
                vec!["Variable".into(), "mean".into()],
                vec![vec![Cell::from("SalePrice"), Cell::from(200700.0)]],
            ),
        ];

        let bytes = to_xlsx_bytes(&sheets).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        for part in [
            "[Content_Types].xml",
            "xl/workbook.xml",
            "xl/worksheets/sheet1.xml",
            "xl/worksheets/sheet2.xml",
            "xl/worksheets/sheet3.xml",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing {}", part);
        }

        let mut workbook = String::new();
        archive
            .by_name("xl/workbook.xml")
            .unwrap()
            .read_to_string(&mut workbook)
            .unwrap();
        assert!(workbook.contains(r#"name="Filtered Data""#));

        let mut sheet = String::new();
        archive
            .by_name("xl/worksheets/sheet3.xml")
            .unwrap()
            .read_to_string(&mut sheet)
            .unwrap();
        assert!(sheet.contains(r#"<c r="B2"><v>200700</v></c>"#));
    }

    #[test]
    fn empty_workbook_is_rejected() {
        assert!(matches!(to_xlsx_bytes(&[]), Err(ExportError::NoSheets)));
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn sheet_names_are_sanitized() {
        let sheet = Sheet::new("Prices [2006/2010]: a very long worksheet title", vec![], vec![]);
        assert!(sheet.name.len() <= 31);
        assert!(!sheet.name.contains('/'));
        assert!(!sheet.name.contains('['));
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
