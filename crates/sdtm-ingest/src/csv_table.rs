use std::collections::BTreeSet;
use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use crate::error::{IngestError, Result};

/// Raw CSV contents: one header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a CSV file; the first non-blank row is the header.
///
/// Blank rows are skipped and short rows are padded with empty cells.
pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let csv_error = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let mut headers: Vec<String> = Vec::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        if headers.is_empty() {
            headers = record.iter().map(normalize_header).collect();
            continue;
        }
        let row = (0..headers.len())
            .map(|idx| record.get(idx).map(normalize_cell).unwrap_or_default())
            .collect();
        rows.push(row);
    }
    let table = CsvTable { headers, rows };
    tracing::debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "read csv table"
    );
    Ok(table)
}

impl CsvTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append rows of a split file, aligning columns by name (case-insensitive).
    pub fn append(&mut self, other: CsvTable) {
        if self.headers.is_empty() {
            *self = other;
            return;
        }
        let mut positions = Vec::with_capacity(other.headers.len());
        for header in &other.headers {
            let existing = self
                .headers
                .iter()
                .position(|name| name.eq_ignore_ascii_case(header));
            let idx = match existing {
                Some(idx) => idx,
                None => {
                    self.headers.push(header.clone());
                    for row in &mut self.rows {
                        row.push(String::new());
                    }
                    self.headers.len() - 1
                }
            };
            positions.push(idx);
        }
        for source in other.rows {
            let mut row = vec![String::new(); self.headers.len()];
            for (value, idx) in source.into_iter().zip(&positions) {
                row[*idx] = value;
            }
            self.rows.push(row);
        }
    }

    /// Convert to a frame of string columns; duplicate headers get a numeric suffix.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut seen = BTreeSet::new();
        let mut columns: Vec<Column> = Vec::with_capacity(self.headers.len());
        for (idx, header) in self.headers.iter().enumerate() {
            let mut name = if header.is_empty() {
                format!("COLUMN{}", idx + 1)
            } else {
                header.clone()
            };
            let mut suffix = 2;
            while !seen.insert(name.to_ascii_uppercase()) {
                name = format!("{header}_{suffix}");
                suffix += 1;
            }
            let values: Vec<&str> = self
                .rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect();
            columns.push(Series::new(name.as_str().into(), values).into());
        }
        Ok(DataFrame::new(columns)?)
    }
}
