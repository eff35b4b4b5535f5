//! Study input and output around the core pipeline.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::{debug, info, warn};

use sdtm_core::ProcessedDomain;
use sdtm_ingest::{CsvTable, discover_domain_files, list_csv_files, read_csv_table};
use sdtm_model::Domain;

/// Raw frames keyed by domain code, with the files each came from.
#[derive(Debug, Default)]
pub struct LoadedStudy {
    pub datasets: BTreeMap<String, DataFrame>,
    pub files: BTreeMap<String, Vec<PathBuf>>,
}

impl LoadedStudy {
    pub fn file_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

/// Study id from the input folder name, `STUDY` when it has none.
pub fn derive_study_id(input_dir: &Path) -> String {
    input_dir
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "STUDY".to_string())
}

/// Read every CSV in `input_dir` that names a known domain.
///
/// Split files of one domain (`AE_PART1.csv`, `AE_PART2.csv`) are
/// concatenated, aligning columns by name.
pub fn load_study(input_dir: &Path, domain_codes: &[String]) -> Result<LoadedStudy> {
    let csv_files = list_csv_files(input_dir)
        .with_context(|| format!("list input files in {}", input_dir.display()))?;
    let files = discover_domain_files(&csv_files, domain_codes);
    if files.is_empty() {
        warn!(input_dir = %input_dir.display(), "no domain files found");
    }

    let mut datasets = BTreeMap::new();
    for (code, paths) in &files {
        let mut table = CsvTable::default();
        for path in paths {
            let part = read_csv_table(path)?;
            debug!(
                domain_code = %code,
                path = %path.display(),
                rows = part.rows.len(),
                "read part"
            );
            table.append(part);
        }
        if table.headers.is_empty() {
            warn!(domain_code = %code, "skipping domain without a header row");
            continue;
        }
        let frame = table
            .to_frame()
            .with_context(|| format!("build {code} frame"))?;
        info!(domain_code = %code, rows = frame.height(), files = paths.len(), "domain loaded");
        datasets.insert(code.clone(), frame);
    }
    Ok(LoadedStudy { datasets, files })
}

/// Schema variables first, in declared order, then anything else the frame carries.
pub fn ordered_columns(domain: &Domain, df: &DataFrame) -> Vec<String> {
    let present: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    let mut ordered: Vec<String> = domain
        .variables
        .iter()
        .filter(|variable| present.contains(&variable.name))
        .map(|variable| variable.name.clone())
        .collect();
    for name in present {
        if !ordered.contains(&name) {
            ordered.push(name);
        }
    }
    ordered
}

/// Write each normalized domain as `<code>.csv`, lower-case file names.
pub fn write_domain_csvs(
    output_dir: &Path,
    domains: &BTreeMap<String, ProcessedDomain>,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;
    let mut written = Vec::with_capacity(domains.len());
    for (code, processed) in domains {
        let path = output_dir.join(format!("{}.csv", code.to_lowercase()));
        let mut frame = processed
            .data
            .select(ordered_columns(&processed.domain, &processed.data))
            .with_context(|| format!("order {code} columns"))?;
        let mut file =
            File::create(&path).with_context(|| format!("create {}", path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)
            .with_context(|| format!("write {}", path.display()))?;
        written.push(path);
    }
    info!(
        output_dir = %output_dir.display(),
        domains = written.len(),
        "normalized domains written"
    );
    Ok(written)
}
