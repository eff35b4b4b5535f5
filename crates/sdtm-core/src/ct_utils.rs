//! Controlled terminology resolution used while processing.
//!
//! Values are mapped to submission values when the codelist recognizes
//! them; unknown values are kept (trimmed) for validation to report.

use sdtm_model::{ControlledTerminology, CtMatchingMode};

/// Upper-case alphanumerics only: `Mg / dL` -> `MGDL`.
pub fn compact_key(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

fn resolve_strict(ct: &ControlledTerminology, trimmed: &str) -> Option<String> {
    let normalized = ct.normalize(trimmed);
    ct.is_valid(&normalized).then_some(normalized)
}

fn resolve_lenient(ct: &ControlledTerminology, trimmed: &str) -> Option<String> {
    if let Some(value) = resolve_strict(ct, trimmed) {
        return Some(value);
    }
    let input = compact_key(trimmed);
    if input.is_empty() {
        return None;
    }
    ct.submission_values
        .iter()
        .find(|submission| compact_key(submission) == input)
        .or_else(|| {
            ct.synonyms
                .iter()
                .find(|(synonym, _)| compact_key(synonym) == input)
                .map(|(_, submission)| submission)
        })
        .cloned()
}

/// Submission value for `raw`, or `None` when the codelist does not know it.
pub fn resolve_ct_value(
    ct: &ControlledTerminology,
    raw: &str,
    mode: CtMatchingMode,
) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match mode {
        CtMatchingMode::Strict => resolve_strict(ct, trimmed),
        CtMatchingMode::Lenient => resolve_lenient(ct, trimmed),
    }
}

/// Submission value when resolvable, otherwise the trimmed input.
pub fn normalize_ct_value(ct: &ControlledTerminology, raw: &str, mode: CtMatchingMode) -> String {
    resolve_ct_value(ct, raw, mode).unwrap_or_else(|| raw.trim().to_string())
}
