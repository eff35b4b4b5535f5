//! Stateless value transformers used by every domain processor.
//!
//! Each function rewrites one or two columns of a frame in place and is
//! safe to run again on its own output.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use polars::prelude::DataFrame;
use tracing::{debug, warn};

use sdtm_model::{ControlledTerminology, CtMatchingMode, SdtmError};

use crate::ct_utils::normalize_ct_value;
use crate::datetime::{compare_dates, normalize_date, study_day};
use crate::duration::normalize_duration;
use crate::frame::{
    has_column, map_string_column, set_f64_column, set_string_column, string_column,
    string_column_or_blank,
};

/// Parse a numeric result such as ` 4.20 `; blanks and text give `None`.
pub fn parse_numeric(value: &str) -> Option<f64> {
    sdtm_ingest::parse_f64(value)
}

/// Tokens that stand for "no value" in source extracts.
pub fn is_na_value(value: &str) -> bool {
    matches!(
        value.trim().to_uppercase().as_str(),
        "" | "NA" | "N/A" | "<NA>" | "NAN" | "NONE" | "NULL"
    )
}

/// Blank out NA-like tokens; returns the number of cleared values.
pub fn clean_na_values(df: &mut DataFrame, column: &str) -> Result<usize> {
    map_string_column(df, column, |value| {
        if is_na_value(value) {
            String::new()
        } else {
            value.to_string()
        }
    })
}

/// Replace whole values matching a token (ignoring case).
pub fn replace_tokens(
    df: &mut DataFrame,
    column: &str,
    replacements: &[(&str, &str)],
) -> Result<usize> {
    let lookup: HashMap<String, &str> = replacements
        .iter()
        .map(|(from, to)| (from.to_uppercase(), *to))
        .collect();
    map_string_column(df, column, |value| {
        match lookup.get(&value.to_uppercase()) {
            Some(replacement) => (*replacement).to_string(),
            None => value.to_string(),
        }
    })
}

const YES_NO_TOKENS: [(&str, &str); 10] = [
    ("YES", "Y"),
    ("Y", "Y"),
    ("TRUE", "Y"),
    ("1", "Y"),
    ("CS", "Y"),
    ("NO", "N"),
    ("N", "N"),
    ("FALSE", "N"),
    ("0", "N"),
    ("NCS", "N"),
];

/// Collapse yes/no spellings to `Y`/`N`; other values are left alone.
pub fn map_yes_no(df: &mut DataFrame, column: &str) -> Result<usize> {
    replace_tokens(df, column, &YES_NO_TOKENS)
}

/// Fill blank `target` values from `source`.
pub fn backward_fill(df: &mut DataFrame, source: &str, target: &str) -> Result<usize> {
    if !has_column(df, source) || !has_column(df, target) {
        return Ok(0);
    }
    let source_vals = string_column(df, source)?;
    let mut target_vals = string_column(df, target)?;
    let mut filled = 0;
    for (target, source) in target_vals.iter_mut().zip(&source_vals) {
        if target.is_empty() && !source.is_empty() {
            target.clone_from(source);
            filled += 1;
        }
    }
    set_string_column(df, target, target_vals)?;
    Ok(filled)
}

/// A unit without a result is meaningless; blank it.
pub fn clear_unit_when_empty(df: &mut DataFrame, result: &str, unit: &str) -> Result<usize> {
    if !has_column(df, result) || !has_column(df, unit) {
        return Ok(0);
    }
    let results = string_column(df, result)?;
    let mut units = string_column(df, unit)?;
    let mut cleared = 0;
    for (unit, result) in units.iter_mut().zip(&results) {
        if result.is_empty() && !unit.is_empty() {
            unit.clear();
            cleared += 1;
        }
    }
    set_string_column(df, unit, units)?;
    Ok(cleared)
}

/// Write `target` as the numeric form of `source`.
pub fn derive_numeric(df: &mut DataFrame, source: &str, target: &str) -> Result<()> {
    if !has_column(df, source) {
        return Ok(());
    }
    let values = string_column(df, source)?
        .iter()
        .map(|value| parse_numeric(value))
        .collect();
    set_f64_column(df, target, values)
}

pub fn normalize_date_column(df: &mut DataFrame, column: &str) -> Result<usize> {
    map_string_column(df, column, normalize_date)
}

pub fn normalize_duration_column(df: &mut DataFrame, column: &str) -> Result<usize> {
    map_string_column(df, column, normalize_duration)
}

/// Derive a study day column from an observation date.
///
/// The baseline is the subject's entry in `reference_starts`, else the
/// same-row `baseline_col` value. Rows without a usable baseline or a
/// complete observation date get a null study day.
pub fn compute_study_day(
    df: &mut DataFrame,
    dtc_col: &str,
    dy_col: &str,
    usubjid_col: Option<&str>,
    reference_starts: &BTreeMap<String, String>,
    baseline_col: Option<&str>,
) -> Result<usize> {
    if !has_column(df, dtc_col) {
        return Ok(0);
    }
    let dtc_vals = string_column(df, dtc_col)?;
    let subjects = string_column_or_blank(df, usubjid_col)?;
    let row_baselines = string_column_or_blank(df, baseline_col)?;

    let mut derived = 0usize;
    let mut missing_reference = 0usize;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let baseline = reference_starts
            .get(&subjects[idx])
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .unwrap_or(row_baselines[idx].as_str());
        if baseline.is_empty() && !dtc_vals[idx].is_empty() {
            missing_reference += 1;
        }
        let day = study_day(&dtc_vals[idx], baseline);
        if day.is_some() {
            derived += 1;
        }
        values.push(day.map(|day| day as f64));
    }
    set_f64_column(df, dy_col, values)?;

    debug!(dtc_col, dy_col, derived, "study days derived");
    if missing_reference > 0 {
        debug!(
            dtc_col,
            dy_col, missing_reference, "study day skipped for records without a reference start"
        );
    }
    Ok(derived)
}

/// Normalize a start/end date pair and make sure the end is not before the start.
///
/// A blank end takes the start value. Returns the number of adjusted ends.
pub fn ensure_date_pair_order(df: &mut DataFrame, start: &str, end: Option<&str>) -> Result<usize> {
    normalize_date_column(df, start)?;
    let Some(end) = end.filter(|end| has_column(df, end)) else {
        return Ok(0);
    };
    if !has_column(df, start) {
        normalize_date_column(df, end)?;
        return Ok(0);
    }
    let starts = string_column(df, start)?;
    let mut ends: Vec<String> = string_column(df, end)?
        .iter()
        .map(|value| normalize_date(value))
        .collect();
    let mut adjusted = 0;
    for (end_value, start_value) in ends.iter_mut().zip(&starts) {
        if start_value.is_empty() {
            continue;
        }
        let before_start = end_value.is_empty()
            || compare_dates(start_value, end_value) == Some(Ordering::Greater);
        if before_start {
            end_value.clone_from(start_value);
            adjusted += 1;
        }
    }
    set_string_column(df, end, ends)?;
    if adjusted > 0 {
        debug!(start, end, adjusted, "end dates aligned with start dates");
    }
    Ok(adjusted)
}

/// Number rows `1, 2, 3, ...` within each group, in row order.
///
/// Without a group column the whole frame is one group.
pub fn assign_sequence(df: &mut DataFrame, seq_col: &str, group_col: Option<&str>) -> Result<()> {
    let groups = string_column_or_blank(df, group_col)?;
    let mut counters: HashMap<&str, u32> = HashMap::new();
    let values: Vec<Option<f64>> = groups
        .iter()
        .map(|group| {
            let counter = counters.entry(group.as_str()).or_insert(0);
            *counter += 1;
            Some(f64::from(*counter))
        })
        .collect();
    set_f64_column(df, seq_col, values)
}

/// Canonicalize a codelist-bound column; returns the number of rewritten values.
pub fn apply_ct(
    df: &mut DataFrame,
    column: &str,
    ct: &ControlledTerminology,
    mode: CtMatchingMode,
) -> Result<usize> {
    map_string_column(df, column, |value| normalize_ct_value(ct, value, mode))
}

/// Fill a blank or code-valued `--TEST` with the preferred term of `--TESTCD`.
pub fn derive_test_from_testcd(
    df: &mut DataFrame,
    testcd: &str,
    test: &str,
    ct: &ControlledTerminology,
) -> Result<usize> {
    if !has_column(df, testcd) {
        return Ok(0);
    }
    let codes = string_column(df, testcd)?;
    let mut names = string_column_or_blank(df, Some(test))?;
    let mut derived = 0;
    for (name, code) in names.iter_mut().zip(&codes) {
        if code.is_empty() || !(name.is_empty() || name.eq_ignore_ascii_case(code)) {
            continue;
        }
        if let Some(preferred) = ct.preferred_term_for(code)
            && *name != preferred
        {
            *name = preferred.to_string();
            derived += 1;
        }
    }
    set_string_column(df, test, names)?;
    Ok(derived)
}

/// Mark the final row of each key group with `Y` (others blank).
pub fn flag_last_observation(df: &mut DataFrame, flag_col: &str, key_cols: &[&str]) -> Result<()> {
    let mut keys = vec![String::new(); df.height()];
    for key_col in key_cols.iter().filter(|name| has_column(df, name)) {
        for (key, value) in keys.iter_mut().zip(string_column(df, key_col)?) {
            key.push_str(&value);
            key.push('|');
        }
    }
    let mut last_idx: HashMap<&str, usize> = HashMap::new();
    for (idx, key) in keys.iter().enumerate() {
        last_idx.insert(key.as_str(), idx);
    }
    let mut flags = vec![String::new(); df.height()];
    for idx in last_idx.into_values() {
        flags[idx] = "Y".to_string();
    }
    set_string_column(df, flag_col, flags)
}

/// Fail when one code value is paired with more than one decode.
///
/// Decodes are compared ignoring case and surrounding whitespace; rows
/// with a blank code or decode are ignored.
pub fn ensure_paired_terms(
    df: &DataFrame,
    domain_code: &str,
    code_col: &str,
    decode_col: &str,
) -> Result<()> {
    if !has_column(df, code_col) || !has_column(df, decode_col) {
        return Ok(());
    }
    let codes = string_column(df, code_col)?;
    let decodes = string_column(df, decode_col)?;
    let mut pairs: BTreeMap<&str, BTreeMap<String, &str>> = BTreeMap::new();
    for (code, decode) in codes.iter().zip(&decodes) {
        if code.is_empty() || decode.is_empty() {
            continue;
        }
        pairs
            .entry(code.as_str())
            .or_default()
            .entry(decode.to_uppercase())
            .or_insert(decode.as_str());
    }
    if let Some((code, seen)) = pairs.into_iter().find(|(_, seen)| seen.len() > 1) {
        warn!(
            domain_code,
            code_col,
            decode_col,
            code,
            decodes = seen.len(),
            "paired terms are inconsistent"
        );
        return Err(SdtmError::PairedTermMismatch {
            domain: domain_code.to_string(),
            code_column: code_col.to_string(),
            decode_column: decode_col.to_string(),
            code: code.to_string(),
            decodes: seen.into_values().map(str::to_string).collect(),
        }
        .into());
    }
    Ok(())
}
