//! Column accessors shared by processors and validation rules.
//!
//! Frames arrive from CSV as string columns; derived numerics are written
//! back as Float64 with nulls for missing values.

use anyhow::Result;
use polars::prelude::{AnyValue, BooleanChunked, DataFrame, NamedFrom, NewChunkedArray, Series};

use sdtm_ingest::{any_to_f64, any_to_string};
use sdtm_model::Domain;

/// Column name as declared by the schema, if the schema has the variable.
pub fn col<'a>(domain: &'a Domain, name: &str) -> Option<&'a str> {
    domain.column_name(name)
}

/// Schema column that is also present in the frame.
pub fn present_col<'a>(domain: &'a Domain, df: &DataFrame, name: &str) -> Option<&'a str> {
    col(domain, name).filter(|column| has_column(df, column))
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Trimmed string values; nulls become empty strings.
pub fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = any_to_string(column.get(idx).unwrap_or(AnyValue::Null));
        values.push(value.trim().to_string());
    }
    Ok(values)
}

/// String values of a column, or blanks when the column is absent.
pub fn string_column_or_blank(df: &DataFrame, name: Option<&str>) -> Result<Vec<String>> {
    match name {
        Some(name) if has_column(df, name) => string_column(df, name),
        _ => Ok(vec![String::new(); df.height()]),
    }
}

pub fn numeric_column_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

/// Replace or append a string column.
pub fn set_string_column(df: &mut DataFrame, name: &str, values: Vec<String>) -> Result<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

/// Replace or append a Float64 column.
pub fn set_f64_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

/// Keep rows where `keep` is true, preserving order.
pub fn filter_rows(df: &mut DataFrame, keep: &[bool]) -> Result<()> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    *df = df.filter(&mask)?;
    Ok(())
}

/// Rewrite a string column in place; returns how many values changed.
pub fn map_string_column<F>(df: &mut DataFrame, name: &str, mut f: F) -> Result<usize>
where
    F: FnMut(&str) -> String,
{
    if !has_column(df, name) {
        return Ok(0);
    }
    let original = string_column(df, name)?;
    let mut changed = 0;
    let updated: Vec<String> = original
        .iter()
        .map(|value| {
            let next = f(value);
            if next != *value {
                changed += 1;
            }
            next
        })
        .collect();
    set_string_column(df, name, updated)?;
    Ok(changed)
}
