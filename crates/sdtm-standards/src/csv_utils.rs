//! CSV row reading shared by the standards loaders.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;

use crate::error::StandardsError;

/// Environment variable for overriding the standards directory.
pub const STANDARDS_ENV_VAR: &str = "CDISC_STANDARDS_DIR";

pub type Row = BTreeMap<String, String>;

/// Standards root: `CDISC_STANDARDS_DIR`, else `standards/` at the workspace root.
pub fn default_standards_root() -> PathBuf {
    if let Ok(root) = std::env::var(STANDARDS_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../standards")
}

/// Read a headed CSV file into row maps keyed by header (BOM stripped, values trimmed).
pub fn read_csv_rows(path: &Path) -> Result<Vec<Row>, StandardsError> {
    if !path.is_file() {
        return Err(StandardsError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| StandardsError::csv(path, &e))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StandardsError::csv(path, &e))?
        .iter()
        .map(|header| header.trim().trim_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| StandardsError::csv(path, &e))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.clone(), value.trim().to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

pub fn get_field<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("")
}

pub fn get_optional(row: &Row, key: &str) -> Option<String> {
    row.get(key).filter(|value| !value.is_empty()).cloned()
}

/// CSV files in `dir` whose name contains `pattern`, sorted.
pub fn csv_files_matching(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, StandardsError> {
    let mut matches = Vec::new();
    if !dir.is_dir() {
        return Ok(matches);
    }
    for entry in std::fs::read_dir(dir).map_err(|e| StandardsError::io(dir, e))? {
        let path = entry.map_err(|e| StandardsError::io(dir, e))?.path();
        let name = path.file_name().and_then(|v| v.to_str()).unwrap_or("");
        if path.is_file() && name.contains(pattern) && name.to_lowercase().ends_with(".csv") {
            matches.push(path);
        }
    }
    matches.sort();
    Ok(matches)
}
