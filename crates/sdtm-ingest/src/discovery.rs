//! Input file discovery and domain matching.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Lists all CSV files in a directory, sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let read_error = |source| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Group CSV files by the domain code found in their file name.
///
/// `STUDY_DM.csv` and `dm.csv` both map to DM; `AE_PART2.csv` maps to AE.
/// Files that look like metadata exports are skipped.
pub fn discover_domain_files(
    csv_files: &[PathBuf],
    supported_domains: &[String],
) -> BTreeMap<String, Vec<PathBuf>> {
    let mut supported: Vec<String> = supported_domains
        .iter()
        .map(|domain| domain.trim().to_uppercase())
        .collect();
    // longest first so "SUPPAE" wins over "AE"
    supported.sort_by_key(|domain| std::cmp::Reverse(domain.len()));

    let mut grouped: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for path in csv_files {
        let stem = path
            .file_stem()
            .and_then(|value| value.to_str())
            .unwrap_or("")
            .to_uppercase();
        if is_metadata_file(&stem) {
            continue;
        }
        match match_domain(&stem, &supported) {
            Some(domain) => grouped.entry(domain).or_default().push(path.clone()),
            None => tracing::debug!(file = %path.display(), "no domain matched"),
        }
    }
    grouped
}

fn is_metadata_file(stem: &str) -> bool {
    ["CODELIST", "ITEMS", "README", "METADATA"]
        .iter()
        .any(|marker| stem.contains(marker))
}

fn match_domain(stem: &str, supported: &[String]) -> Option<String> {
    let parts: Vec<&str> = stem.split(['_', '-', ' ', '.']).collect();
    if let Some(domain) = supported
        .iter()
        .find(|domain| parts.iter().any(|part| *part == domain.as_str()))
    {
        return Some(domain.clone());
    }
    supported
        .iter()
        .find(|domain| parts.first().is_some_and(|part| part.starts_with(domain.as_str())))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains() -> Vec<String> {
        ["DM", "AE", "SUPPAE", "LB"]
            .iter()
            .map(|code| code.to_string())
            .collect()
    }

    #[test]
    fn matches_exact_segment() {
        let mut supported = domains();
        supported.sort_by_key(|domain| std::cmp::Reverse(domain.len()));
        assert_eq!(match_domain("STUDY01_DM", &supported), Some("DM".to_string()));
        assert_eq!(match_domain("SUPPAE", &supported), Some("SUPPAE".to_string()));
        assert_eq!(match_domain("LB2", &supported), Some("LB".to_string()));
        assert_eq!(match_domain("NOTES", &supported), None);
    }

    #[test]
    fn groups_split_files() {
        let files = vec![
            PathBuf::from("ae_part1.csv"),
            PathBuf::from("AE_PART2.csv"),
            PathBuf::from("dm.csv"),
            PathBuf::from("codelists.csv"),
        ];
        let grouped = discover_domain_files(&files, &domains());
        assert_eq!(grouped.get("AE").map(Vec::len), Some(2));
        assert_eq!(grouped.get("DM").map(Vec::len), Some(1));
        assert_eq!(grouped.len(), 2);
    }
}
