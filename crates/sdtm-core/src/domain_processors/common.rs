use anyhow::Result;
use polars::prelude::DataFrame;
use tracing::warn;

use sdtm_model::{Domain, UsubjidPrefixMode};

use crate::pipeline_context::PipelineContext;
use crate::transforms::{
    apply_ct, backward_fill, compute_study_day, ensure_date_pair_order, map_yes_no,
    normalize_date_column, normalize_duration_column, replace_tokens,
};

pub(super) use crate::frame::{
    col, filter_rows, has_column, map_string_column, numeric_column_f64, present_col,
    set_f64_column, set_string_column, string_column, string_column_or_blank,
};

/// `--STAT` spellings; only "NOT DONE" is a valid status.
pub(super) const STATUS_MAP: [(&str, &str); 4] = [
    ("ND", "NOT DONE"),
    ("NOTDONE", "NOT DONE"),
    ("DONE", ""),
    ("COMPLETED", ""),
];

/// Drop placeholder/header rows that have no usable USUBJID.
///
/// A blank USUBJID is first rebuilt from STUDYID + SUBJID. Surviving
/// identifiers are then prefixed with their own STUDYID. Returns the number of
/// dropped rows.
pub(crate) fn drop_placeholder_rows(
    domain: &Domain,
    df: &mut DataFrame,
    context: &PipelineContext,
) -> Result<usize> {
    let Some(usubjid_col) = present_col(domain, df, "USUBJID") else {
        return Ok(0);
    };
    let mut usubjid_vals: Vec<String> = string_column(df, usubjid_col)?
        .iter()
        .map(|value| strip_quotes(value))
        .collect();
    let studyid_vals = string_column_or_blank(df, present_col(domain, df, "STUDYID"))?;

    if usubjid_vals.iter().any(|value| is_missing_usubjid(value))
        && let Some(subjid_col) = present_col(domain, df, "SUBJID")
    {
        let subjid_vals = string_column(df, subjid_col)?;
        for idx in 0..df.height() {
            if !is_missing_usubjid(&usubjid_vals[idx]) {
                continue;
            }
            let subjid = strip_quotes(&subjid_vals[idx]);
            if is_missing_usubjid(&subjid) || is_header_token(&subjid) {
                continue;
            }
            let studyid = strip_quotes(&studyid_vals[idx]);
            let studyid = if studyid.is_empty() {
                context.study_id.as_str()
            } else {
                studyid.as_str()
            };
            usubjid_vals[idx] = if studyid.is_empty() {
                subjid
            } else {
                format!("{studyid}-{subjid}")
            };
        }
    }

    let keep: Vec<bool> = usubjid_vals
        .iter()
        .map(|value| !is_missing_usubjid(value) && !is_header_token(value))
        .collect();
    let dropped = keep.iter().filter(|keep| !**keep).count();
    set_string_column(df, usubjid_col, usubjid_vals)?;
    if dropped > 0 {
        warn!(
            domain_code = %domain.code,
            dropped_count = dropped,
            "dropped rows with missing USUBJID"
        );
        filter_rows(df, &keep)?;
    }

    if context.options.usubjid_prefix == UsubjidPrefixMode::Prefix {
        apply_usubjid_prefix(domain, df, context)?;
    }
    Ok(dropped)
}

/// Prefix each USUBJID with its row's STUDYID, or the study id when that is blank.
fn apply_usubjid_prefix(
    domain: &Domain,
    df: &mut DataFrame,
    context: &PipelineContext,
) -> Result<()> {
    let Some(usubjid_col) = present_col(domain, df, "USUBJID") else {
        return Ok(());
    };
    let studyid_vals = string_column_or_blank(df, present_col(domain, df, "STUDYID"))?;
    let fallback = context.study_id.trim();
    let values = string_column(df, usubjid_col)?
        .into_iter()
        .zip(&studyid_vals)
        .map(|(value, studyid)| {
            let studyid = strip_quotes(studyid);
            let study_id = if studyid.is_empty() {
                fallback
            } else {
                studyid.as_str()
            };
            let prefix = format!("{study_id}-");
            if value.is_empty() || study_id.is_empty() || value.starts_with(&prefix) {
                value
            } else {
                format!("{prefix}{value}")
            }
        })
        .collect();
    set_string_column(df, usubjid_col, values)
}

fn strip_quotes(value: &str) -> String {
    value.trim().chars().filter(|ch| *ch != '"').collect()
}

fn is_missing_usubjid(value: &str) -> bool {
    matches!(
        value.trim().to_uppercase().as_str(),
        "" | "NAN" | "<NA>" | "NA" | "NONE" | "NULL"
    )
}

/// Repeated header rows in concatenated extracts.
fn is_header_token(value: &str) -> bool {
    matches!(
        value.trim().to_uppercase().as_str(),
        "USUBJID" | "SUBJID" | "SUBJECTID" | "SUBJECT ID"
    )
}

/// Derive `(date, day)` pairs against the subject reference start.
pub(super) fn study_days(
    domain: &Domain,
    df: &mut DataFrame,
    context: &PipelineContext,
    pairs: &[(&str, &str)],
) -> Result<()> {
    let usubjid = present_col(domain, df, "USUBJID");
    let baseline = present_col(domain, df, "RFSTDTC");
    for (dtc, dy) in pairs {
        if let (Some(dtc), Some(dy)) = (present_col(domain, df, dtc), col(domain, dy)) {
            compute_study_day(df, dtc, dy, usubjid, &context.reference_starts, baseline)?;
        }
    }
    Ok(())
}

/// Normalize a start/end pair; the end is never left before the start.
pub(super) fn date_pair(domain: &Domain, df: &mut DataFrame, start: &str, end: &str) -> Result<()> {
    if let Some(start) = present_col(domain, df, start) {
        ensure_date_pair_order(df, start, present_col(domain, df, end))?;
    } else if let Some(end) = present_col(domain, df, end) {
        normalize_date_column(df, end)?;
    }
    Ok(())
}

pub(super) fn normalize_dates(domain: &Domain, df: &mut DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        if let Some(column) = present_col(domain, df, name) {
            normalize_date_column(df, column)?;
        }
    }
    Ok(())
}

pub(super) fn normalize_durations(
    domain: &Domain,
    df: &mut DataFrame,
    names: &[&str],
) -> Result<()> {
    for name in names {
        if let Some(column) = present_col(domain, df, name) {
            normalize_duration_column(df, column)?;
        }
    }
    Ok(())
}

/// Canonicalize the given variables through their codelists.
pub(super) fn ct_columns(
    domain: &Domain,
    df: &mut DataFrame,
    context: &PipelineContext,
    names: &[&str],
) -> Result<()> {
    for name in names {
        if let Some(column) = present_col(domain, df, name)
            && let Some(ct) = context.resolve_ct(domain, name)
        {
            apply_ct(df, column, ct, context.options.ct_matching)?;
        }
    }
    Ok(())
}

pub(super) fn replace_in(
    domain: &Domain,
    df: &mut DataFrame,
    name: &str,
    replacements: &[(&str, &str)],
) -> Result<()> {
    if let Some(column) = present_col(domain, df, name) {
        replace_tokens(df, column, replacements)?;
    }
    Ok(())
}

pub(super) fn yes_no(domain: &Domain, df: &mut DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        if let Some(column) = present_col(domain, df, name) {
            map_yes_no(df, column)?;
        }
    }
    Ok(())
}

pub(super) fn fill_from(
    domain: &Domain,
    df: &mut DataFrame,
    source: &str,
    target: &str,
) -> Result<()> {
    if let (Some(source), Some(target)) = (
        present_col(domain, df, source),
        present_col(domain, df, target),
    ) {
        backward_fill(df, source, target)?;
    }
    Ok(())
}

/// Upper-case and trim code-like columns (`ARMCD`, `ETCD`).
pub(super) fn upper_columns(domain: &Domain, df: &mut DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        if let Some(column) = present_col(domain, df, name) {
            map_string_column(df, column, str::to_uppercase)?;
        }
    }
    Ok(())
}

/// Rewrite a column as Float64.
pub(super) fn numeric_columns(domain: &Domain, df: &mut DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        if let Some(column) = present_col(domain, df, name) {
            let values = numeric_column_f64(df, column)?;
            set_f64_column(df, column, values)?;
        }
    }
    Ok(())
}
