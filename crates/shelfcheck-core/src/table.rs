//! Rectangular tables read from spreadsheet exports (CSV or workbook).

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::ConfigError;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Column names plus rows of raw cell text. Every row has exactly
/// `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Load a table, picking the reader from the file extension: `.csv` goes
/// through [`load_csv_table`], workbook formats through
/// [`load_workbook_table`].
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] for an unknown extension, otherwise
/// whatever the chosen loader returns.
pub fn load_table(path: &Path) -> Result<Table, ConfigError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "csv" => load_csv_table(path),
        ext if WORKBOOK_EXTENSIONS.contains(&ext) => load_workbook_table(path),
        _ => Err(ConfigError::Validation(format!(
            "{} is not a supported table file; expected .csv or one of .{}",
            path.display(),
            WORKBOOK_EXTENSIONS.join(", .")
        ))),
    }
}

/// Load the first worksheet of a workbook. The first row is the header.
///
/// Empty cells become empty strings; numbers use their shortest decimal
/// form, so an integer SKU stored as a number reads back as `1139375`.
///
/// # Errors
///
/// Returns [`ConfigError::SpreadsheetRead`] if the workbook cannot be
/// opened or parsed, and [`ConfigError::Validation`] for a missing sheet,
/// missing header, or empty or duplicate column names.
pub fn load_workbook_table(path: &Path) -> Result<Table, ConfigError> {
    let label = path.display().to_string();
    let to_err = |source: calamine::Error| ConfigError::SpreadsheetRead {
        path: label.clone(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(to_err)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ConfigError::Validation(format!("{label} has no worksheets")))?
        .map_err(to_err)?;

    let mut sheet_rows = range.rows();
    let columns: Vec<String> = sheet_rows
        .next()
        .ok_or_else(|| ConfigError::Validation(format!("{label} has no header row")))?
        .iter()
        .map(|cell| cell_text(cell).trim().to_owned())
        .collect();
    validate_columns(&columns, &label)?;

    let rows = sheet_rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(Table { columns, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn validate_columns(columns: &[String], label: &str) -> Result<(), ConfigError> {
    if columns.is_empty() {
        return Err(ConfigError::Validation(format!("{label} has no header row")));
    }
    let mut seen = HashSet::new();
    for (idx, column) in columns.iter().enumerate() {
        if column.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{label} has an empty column name at position {}",
                idx + 1
            )));
        }
        if !seen.insert(column.as_str()) {
            return Err(ConfigError::Validation(format!(
                "{label} has duplicate column name '{column}'"
            )));
        }
    }
    Ok(())
}

/// Load a CSV file with a header row.
///
/// # Errors
///
/// Returns [`ConfigError::TableRead`] if the file cannot be read or a row
/// has a different number of cells than the header, and
/// [`ConfigError::Validation`] for empty or duplicate column names.
pub fn load_csv_table(path: &Path) -> Result<Table, ConfigError> {
    let file = std::fs::File::open(path).map_err(|e| ConfigError::TableRead {
        path: path.display().to_string(),
        source: csv::Error::from(e),
    })?;
    parse_csv_table(file, &path.display().to_string())
}

/// Parse CSV from any reader. `label` names the source in errors.
///
/// # Errors
///
/// See [`load_csv_table`].
pub fn parse_csv_table<R: Read>(reader: R, label: &str) -> Result<Table, ConfigError> {
    let to_err = |source: csv::Error| ConfigError::TableRead {
        path: label.to_string(),
        source,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader
        .headers()
        .map_err(to_err)?
        .iter()
        .map(str::to_owned)
        .collect();

    validate_columns(&columns, label)?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(to_err)?;
        rows.push(record.iter().map(str::to_owned).collect());
    }

    Ok(Table { columns, rows })
}
