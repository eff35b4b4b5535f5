//! Controlled terminology loader for the `*_CT_*.csv` exports.
//!
//! Codelist rows have a blank `Codelist Code` and carry the codelist's own
//! code in `Code`; term rows reference their parent through `Codelist Code`.

use std::path::Path;

use sdtm_model::{ControlledTerminology, CtCatalog, CtRegistry};

use crate::csv_utils::{csv_files_matching, get_field, get_optional, read_csv_rows};
use crate::error::StandardsError;

/// Load every `*_CT_*.csv` file found in `dir`.
pub fn load_ct_registry(dir: &Path) -> Result<CtRegistry, StandardsError> {
    let mut registry = CtRegistry::new();
    for path in csv_files_matching(dir, "_CT_")? {
        registry.add_catalog(load_ct_catalog(&path)?);
    }
    tracing::debug!(
        dir = %dir.display(),
        codelists = registry.codelist_count(),
        "loaded controlled terminology"
    );
    Ok(registry)
}

/// Load a single CT export file.
pub fn load_ct_catalog(path: &Path) -> Result<CtCatalog, StandardsError> {
    let rows = read_csv_rows(path)?;
    let (label, version) = parse_ct_metadata(path);
    let source = path
        .file_name()
        .and_then(|v| v.to_str())
        .unwrap_or_default()
        .to_string();
    let mut catalog = CtCatalog::new(label, version);

    for row in &rows {
        let code = get_field(row, "Code");
        if !get_field(row, "Codelist Code").is_empty() || code.is_empty() {
            continue;
        }
        let extensible = get_field(row, "Codelist Extensible (Yes/No)").eq_ignore_ascii_case("yes");
        let mut ct = ControlledTerminology::new(code, get_field(row, "Codelist Name"), extensible);
        ct.sources.push(source.clone());
        catalog.insert(ct);
        catalog.alias(get_field(row, "CDISC Submission Value"), code);
    }

    for row in &rows {
        let parent = get_field(row, "Codelist Code").to_uppercase();
        let value = get_field(row, "CDISC Submission Value");
        if parent.is_empty() || value.is_empty() {
            continue;
        }
        let Some(ct) = catalog.by_code.get_mut(&parent) else {
            tracing::warn!(codelist = %parent, term = value, "term without codelist row");
            continue;
        };
        ct.add_submission_value(value);
        for synonym in parse_synonyms(get_field(row, "CDISC Synonym(s)")) {
            ct.add_synonym(&synonym, value);
        }
        if let Some(term_code) = get_optional(row, "Code") {
            ct.nci_codes.insert(value.to_string(), term_code);
        }
        if let Some(definition) = get_optional(row, "CDISC Definition") {
            ct.definitions.insert(value.to_string(), definition);
        }
        if let Some(preferred) = get_optional(row, "NCI Preferred Term") {
            ct.preferred_terms.insert(value.to_string(), preferred);
        }
    }

    Ok(catalog)
}

/// `SDTM_CT_2024-03-29.csv` -> ("SDTM CT", Some("2024-03-29")).
fn parse_ct_metadata(path: &Path) -> (String, Option<String>) {
    let stem = path.file_stem().and_then(|v| v.to_str()).unwrap_or("");
    match stem.split_once("_CT_") {
        Some((prefix, date)) => {
            let version = (!date.is_empty()).then(|| date.to_string());
            (format!("{} CT", prefix.to_uppercase()), version)
        }
        None => (stem.to_string(), None),
    }
}

fn parse_synonyms(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
