//! Demographics (DM).
//!
//! DM is processed before every other domain: its RFSTDTC values become
//! the study-day baseline of the whole study.
//!
//! Blank or unknown SEX, RACE and ETHNIC get their "unknown" terms, COUNTRY
//! gets the configured default country, AGE is derived from BRTHDTC and
//! RFSTDTC, and AGEU defaults to YEARS wherever AGE is known.

use std::cmp::Ordering;

use anyhow::Result;
use polars::prelude::DataFrame;
use tracing::debug;

use sdtm_model::Domain;

use crate::datetime::{compare_dates, parse_date};
use crate::pipeline_context::PipelineContext;
use crate::transforms::is_na_value;

use super::common::{
    col, ct_columns, has_column, normalize_dates, numeric_column_f64, numeric_columns,
    present_col, set_f64_column, set_string_column, string_column, string_column_or_blank,
    study_days, upper_columns,
};
use super::processor_trait::DomainProcessor;

/// Reference dates that must not decrease from left to right.
const REFERENCE_CHAIN: [&str; 5] = ["RFICDTC", "RFSTDTC", "RFXSTDTC", "RFXENDTC", "RFPENDTC"];

const DATE_COLUMNS: [&str; 9] = [
    "RFSTDTC", "RFENDTC", "RFXSTDTC", "RFXENDTC", "RFICDTC", "RFPENDTC", "DTHDTC", "BRTHDTC",
    "DMDTC",
];

/// Arm and exposure fields cleared for subjects never assigned to an arm.
const UNASSIGNED_CLEARED: [&str; 6] = [
    "ARM", "ACTARM", "ARMCD", "ACTARMCD", "RFXSTDTC", "RFXENDTC",
];

const NOT_ASSIGNED: &str = "NOT ASSIGNED";

pub(super) struct DmProcessor;

impl DomainProcessor for DmProcessor {
    fn domain_code(&self) -> &'static str {
        "DM"
    }

    fn description(&self) -> &'static str {
        "Demographic defaults, death flag, reference date ordering, unassigned arms"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        normalize_dates(domain, df, &DATE_COLUMNS)?;

        // Defaults only replace blanks and unknown tokens
        default_when_unknown(domain, df, "SEX", "U")?;
        default_when_unknown(domain, df, "RACE", "UNKNOWN")?;
        default_when_unknown(domain, df, "ETHNIC", "UNKNOWN")?;
        if let Some(country) = context.options.default_country.as_deref() {
            default_when_unknown(domain, df, "COUNTRY", &country.trim().to_uppercase())?;
        }
        upper_columns(domain, df, &["COUNTRY", "ARMCD", "ACTARMCD"])?;
        derive_death_flag(domain, df)?;

        clear_unassigned_arms(domain, df)?;
        order_reference_dates(domain, df)?;

        numeric_columns(domain, df, &["AGE"])?;
        derive_age(domain, df)?;
        default_age_unit(domain, df)?;

        // DM has no reference map of its own yet; RFSTDTC on the row is the baseline
        study_days(domain, df, context, &[("DMDTC", "DMDY")])?;
        ct_columns(domain, df, context, &["SEX", "RACE", "ETHNIC", "AGEU", "COUNTRY"])?;
        Ok(())
    }
}

fn is_unknown_token(value: &str) -> bool {
    is_na_value(value) || matches!(value.to_uppercase().as_str(), "U" | "UNK" | "UNKNOWN")
}

fn default_when_unknown(
    domain: &Domain,
    df: &mut DataFrame,
    name: &str,
    default: &str,
) -> Result<()> {
    if let Some(column) = present_col(domain, df, name) {
        let values = string_column(df, column)?
            .into_iter()
            .map(|value| {
                if is_unknown_token(&value) {
                    default.to_string()
                } else {
                    value
                }
            })
            .collect();
        set_string_column(df, column, values)?;
    }
    Ok(())
}

/// Missing AGE in whole years from BRTHDTC to RFSTDTC, when both are full dates.
fn derive_age(domain: &Domain, df: &mut DataFrame) -> Result<()> {
    let (Some(age), Some(birth), Some(start)) = (
        col(domain, "AGE"),
        present_col(domain, df, "BRTHDTC"),
        present_col(domain, df, "RFSTDTC"),
    ) else {
        return Ok(());
    };
    let mut ages = if has_column(df, age) {
        numeric_column_f64(df, age)?
    } else {
        vec![None; df.height()]
    };
    let births = string_column(df, birth)?;
    let starts = string_column(df, start)?;
    let mut derived = 0usize;
    for ((value, birth), start) in ages.iter_mut().zip(&births).zip(&starts) {
        if value.is_some() {
            continue;
        }
        if let (Some(birth), Some(start)) = (parse_date(birth), parse_date(start))
            && let Some(years) = start.years_since(birth)
        {
            *value = Some(f64::from(years));
            derived += 1;
        }
    }
    if derived > 0 {
        set_f64_column(df, age, ages)?;
        debug!(derived, "AGE derived from BRTHDTC and RFSTDTC");
    }
    Ok(())
}

fn default_age_unit(domain: &Domain, df: &mut DataFrame) -> Result<()> {
    let (Some(age), Some(ageu)) = (present_col(domain, df, "AGE"), col(domain, "AGEU")) else {
        return Ok(());
    };
    let ages = string_column(df, age)?;
    let mut units = string_column_or_blank(df, Some(ageu))?;
    for (unit, age) in units.iter_mut().zip(&ages) {
        if unit.is_empty() && !age.is_empty() {
            *unit = "YEARS".to_string();
        }
    }
    set_string_column(df, ageu, units)
}

/// DTHFL is `Y` when a death date exists or the source says yes, blank otherwise.
fn derive_death_flag(domain: &Domain, df: &mut DataFrame) -> Result<()> {
    let Some(flag) = col(domain, "DTHFL") else {
        return Ok(());
    };
    if !has_column(df, flag) && present_col(domain, df, "DTHDTC").is_none() {
        return Ok(());
    }
    let death_dates = string_column_or_blank(df, present_col(domain, df, "DTHDTC"))?;
    let flags: Vec<String> = string_column_or_blank(df, Some(flag))?
        .iter()
        .zip(&death_dates)
        .map(|(value, date)| {
            let yes = matches!(value.to_uppercase().as_str(), "Y" | "YES" | "TRUE" | "1");
            if yes || !date.is_empty() {
                "Y".to_string()
            } else {
                String::new()
            }
        })
        .collect();
    set_string_column(df, flag, flags)
}

/// Subjects with neither a planned nor an actual arm code carry no arm
/// data and get ARMNRS = "NOT ASSIGNED".
fn clear_unassigned_arms(domain: &Domain, df: &mut DataFrame) -> Result<()> {
    let armcd = present_col(domain, df, "ARMCD");
    let actarmcd = present_col(domain, df, "ACTARMCD");
    if armcd.is_none() && actarmcd.is_none() {
        return Ok(());
    }
    let planned = string_column_or_blank(df, armcd)?;
    let actual = string_column_or_blank(df, actarmcd)?;
    let unassigned: Vec<bool> = planned
        .iter()
        .zip(&actual)
        .map(|(planned, actual)| planned.is_empty() && actual.is_empty())
        .collect();
    let count = unassigned.iter().filter(|flag| **flag).count();
    if count == 0 {
        return Ok(());
    }

    for name in UNASSIGNED_CLEARED {
        if let Some(column) = present_col(domain, df, name) {
            let mut values = string_column(df, column)?;
            for (value, clear) in values.iter_mut().zip(&unassigned) {
                if *clear {
                    value.clear();
                }
            }
            set_string_column(df, column, values)?;
        }
    }
    if let Some(armnrs) = col(domain, "ARMNRS") {
        let mut reasons = string_column_or_blank(df, Some(armnrs))?;
        for (reason, stamp) in reasons.iter_mut().zip(&unassigned) {
            if *stamp && reason.is_empty() {
                *reason = NOT_ASSIGNED.to_string();
            }
        }
        set_string_column(df, armnrs, reasons)?;
    }
    debug!(unassigned = count, "cleared arm data for unassigned subjects");
    Ok(())
}

/// Raise any reference date that precedes an earlier pillar to that pillar.
fn order_reference_dates(domain: &Domain, df: &mut DataFrame) -> Result<()> {
    let columns: Vec<&str> = REFERENCE_CHAIN
        .iter()
        .filter_map(|name| present_col(domain, df, name))
        .collect();
    if columns.len() < 2 {
        return Ok(());
    }
    let mut chain = columns
        .iter()
        .map(|column| string_column(df, column))
        .collect::<Result<Vec<_>>>()?;

    let mut clamped = 0usize;
    for row in 0..df.height() {
        let mut floor: Option<String> = None;
        for values in chain.iter_mut() {
            let value = &mut values[row];
            if value.is_empty() {
                continue;
            }
            match &floor {
                Some(previous) if compare_dates(previous, value) == Some(Ordering::Greater) => {
                    value.clone_from(previous);
                    clamped += 1;
                }
                _ => floor = Some(value.clone()),
            }
        }
    }
    for (column, values) in columns.iter().zip(chain) {
        set_string_column(df, column, values)?;
    }
    if clamped > 0 {
        debug!(clamped, "reference dates clamped to keep their order");
    }
    Ok(())
}
