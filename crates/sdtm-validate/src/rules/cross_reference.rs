//! Rules that look at more than one domain.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use sdtm_core::ProcessedDomain;
use sdtm_core::frame::{present_col, string_column, string_column_or_blank};
use sdtm_model::{IssueCategory, Severity, ValidationIssue};

use crate::context::{ValidationContext, domain_subjects};
use crate::engine::ValidationRule;
use crate::error::RuleError;

/// Domains whose records are not tied to a subject visit.
const VISIT_EXEMPT_DOMAINS: [&str; 11] = [
    "DM", "SV", "SE", "CO", "RELREC", "TA", "TE", "TI", "TS", "TV", "TD",
];

/// Arm codes allowed without a trial arm definition.
const ARM_EXEMPT_CODES: [&str; 4] = ["SCRNFAIL", "NOTASSGN", "NOTTRT", "UNPLAN"];

/// Every subject outside DM is enrolled in DM.
pub struct SubjectInDm;

impl ValidationRule for SubjectInDm {
    fn id(&self) -> &'static str {
        "XREF.SUBJECT_IN_DM"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::CrossReference
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        if context.code() == "DM" || context.domain.is_trial_design() {
            return Ok(Vec::new());
        }
        let Some(column) = context.column("USUBJID") else {
            return Ok(Vec::new());
        };
        let Some(dm) = context.other("DM") else {
            return Ok(Vec::new());
        };
        let enrolled = domain_subjects(dm)?;
        let values = context.strings(column)?;
        let missing: BTreeSet<&str> = values
            .iter()
            .map(String::as_str)
            .filter(|subject| !subject.is_empty() && !enrolled.contains(*subject))
            .collect();
        if missing.is_empty() {
            return Ok(Vec::new());
        }
        let records = values
            .iter()
            .filter(|subject| missing.contains(subject.as_str()))
            .count();
        Ok(vec![
            context
                .issue(
                    self.id(),
                    Severity::Error,
                    self.category(),
                    format!("{} subject(s) are not in DM", missing.len()),
                )
                .on_variable(column)
                .with_detail("count", missing.len())
                .with_detail("record_count", records)
                .with_detail("subjects", context.sample(missing.iter().copied())),
        ])
    }
}

/// Visits recorded in a domain have a matching SV record.
///
/// "NOT DONE" records and events that did not occur are skipped.
pub struct VisitInSv;

impl ValidationRule for VisitInSv {
    fn id(&self) -> &'static str {
        "XREF.VISIT_IN_SV"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::CrossReference
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        if VISIT_EXEMPT_DOMAINS.contains(&context.code()) || context.domain.is_trial_design() {
            return Ok(Vec::new());
        }
        let Some(sv) = context.other("SV") else {
            return Ok(Vec::new());
        };
        // VISITNUM when both sides carry it, else the visit name.
        let key = ["VISITNUM", "VISIT"].into_iter().find_map(|name| {
            present_col(&sv.domain, &sv.data, name)?;
            context.column(name)
        });
        let Some(key) = key else {
            return Ok(Vec::new());
        };
        let scheduled = subject_keys(sv, key)?;

        let subjects = context.subjects()?;
        let visits = context.strings(key)?;
        let status = string_column_or_blank(
            context.data,
            context.column(&context.domain.prefixed("STAT")),
        )?;
        let occurred = string_column_or_blank(
            context.data,
            context.column(&context.domain.prefixed("OCCUR")),
        )?;

        let mut unmatched = BTreeSet::new();
        let mut records = 0usize;
        for idx in 0..visits.len() {
            if visits[idx].is_empty()
                || subjects[idx].is_empty()
                || status[idx].eq_ignore_ascii_case("NOT DONE")
                || occurred[idx].eq_ignore_ascii_case("N")
            {
                continue;
            }
            if !scheduled.contains(&(subjects[idx].clone(), visit_key(&visits[idx]))) {
                records += 1;
                unmatched.insert(format!("{} {}", subjects[idx], visits[idx]));
            }
        }
        if records == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![
            context
                .issue(
                    self.id(),
                    Severity::Warning,
                    self.category(),
                    format!("{records} record(s) have a {key} with no SV record"),
                )
                .on_variable(key)
                .with_detail("count", records)
                .with_detail("visits", context.sample(unmatched.iter().map(String::as_str))),
        ])
    }
}

fn subject_keys(
    domain: &ProcessedDomain,
    key: &str,
) -> Result<BTreeSet<(String, String)>, RuleError> {
    let column = |name: &str| present_col(&domain.domain, &domain.data, name);
    let subjects = string_column_or_blank(&domain.data, column("USUBJID"))?;
    let values = string_column_or_blank(&domain.data, column(key))?;
    Ok(subjects
        .into_iter()
        .zip(values.iter().map(|value| visit_key(value)))
        .collect())
}

/// Numeric visits compare by value (`1.0` matches `1`), anything else as text.
fn visit_key(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => number.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Arm codes are defined in TA.
pub struct ArmInTa;

impl ValidationRule for ArmInTa {
    fn id(&self) -> &'static str {
        "XREF.ARM_IN_TA"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::CrossReference
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        if context.code() == "TA" {
            return Ok(Vec::new());
        }
        let Some(ta) = context.other("TA") else {
            return Ok(Vec::new());
        };
        let Some(ta_col) = present_col(&ta.domain, &ta.data, "ARMCD") else {
            return Ok(Vec::new());
        };
        let defined: BTreeSet<String> = string_column(&ta.data, ta_col)?.into_iter().collect();

        let mut issues = Vec::new();
        for name in ["ARMCD", "ACTARMCD"] {
            let Some(column) = context.column(name) else {
                continue;
            };
            let values = context.strings(column)?;
            let undefined: Vec<&str> = values
                .iter()
                .map(String::as_str)
                .filter(|code| {
                    !code.is_empty()
                        && !ARM_EXEMPT_CODES.contains(code)
                        && !defined.contains(*code)
                })
                .collect();
            if undefined.is_empty() {
                continue;
            }
            issues.push(
                context
                    .issue(
                        self.id(),
                        Severity::Error,
                        self.category(),
                        format!("{column} has {} value(s) not defined in TA", undefined.len()),
                    )
                    .on_variable(column)
                    .with_detail("count", undefined.len())
                    .with_detail("values", context.sample(undefined.iter().copied())),
            );
        }
        Ok(issues)
    }
}

/// `RDOMAIN`/`IDVAR`/`IDVARVAL` point at an existing record.
pub struct RecordReference;

impl ValidationRule for RecordReference {
    fn id(&self) -> &'static str {
        "XREF.RECORD_REFERENCE"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::CrossReference
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let Some(rdomain_col) = context.column("RDOMAIN") else {
            return Ok(Vec::new());
        };
        let targets = context.strings(rdomain_col)?;
        let idvars = string_column_or_blank(context.data, context.column("IDVAR"))?;
        let idvarvals = string_column_or_blank(context.data, context.column("IDVARVAL"))?;
        let subjects = context.subjects()?;

        // (domain, variable) -> (subject, value) pairs of the referenced records
        let mut index: BTreeMap<(String, String), Option<BTreeSet<(String, String)>>> =
            BTreeMap::new();
        let mut unresolved = Vec::new();
        for idx in 0..targets.len() {
            let target = targets[idx].to_uppercase();
            if target.is_empty() {
                continue;
            }
            let variable = if idvars[idx].is_empty() {
                "USUBJID".to_string()
            } else {
                idvars[idx].to_uppercase()
            };
            let records = match index.entry((target.clone(), variable.clone())) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    entry.insert(referenced_records(context.other(&target), &variable)?)
                }
            };
            let value = if idvars[idx].is_empty() {
                subjects[idx].clone()
            } else {
                idvarvals[idx].clone()
            };
            let resolved = records.as_ref().is_some_and(|records| {
                records.contains(&(subjects[idx].clone(), value.clone()))
                    || (subjects[idx].is_empty()
                        && records.iter().any(|(_, candidate)| *candidate == value))
            });
            if !resolved {
                unresolved.push(format!("{target}.{variable}={value}"));
            }
        }
        if unresolved.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![
            context
                .issue(
                    self.id(),
                    Severity::Error,
                    self.category(),
                    format!("{} record reference(s) do not resolve", unresolved.len()),
                )
                .on_variable(rdomain_col)
                .with_detail("count", unresolved.len())
                .with_detail("references", context.sample(unresolved.iter().map(String::as_str))),
        ])
    }
}

/// `(USUBJID, value)` pairs of a referenced domain; `None` when the domain
/// or the variable does not exist.
fn referenced_records(
    domain: Option<&ProcessedDomain>,
    variable: &str,
) -> Result<Option<BTreeSet<(String, String)>>, RuleError> {
    let Some(domain) = domain else {
        return Ok(None);
    };
    let Some(column) = present_col(&domain.domain, &domain.data, variable) else {
        return Ok(None);
    };
    let values = string_column(&domain.data, column)?;
    let subjects = string_column_or_blank(
        &domain.data,
        present_col(&domain.domain, &domain.data, "USUBJID"),
    )?;
    Ok(Some(subjects.into_iter().zip(values).collect()))
}

/// DM holds one record per subject.
pub struct DmUniqueSubject;

impl ValidationRule for DmUniqueSubject {
    fn id(&self) -> &'static str {
        "XREF.DM_UNIQUE_SUBJECT"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::CrossReference
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        if context.code() != "DM" {
            return Ok(Vec::new());
        }
        let Some(column) = context.column("USUBJID") else {
            return Ok(Vec::new());
        };
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for subject in context.strings(column)? {
            if !subject.is_empty() {
                *counts.entry(subject).or_default() += 1;
            }
        }
        let duplicated: Vec<&str> = counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(subject, _)| subject.as_str())
            .collect();
        if duplicated.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![
            context
                .issue(
                    self.id(),
                    Severity::Error,
                    self.category(),
                    format!("{} subject(s) appear more than once in DM", duplicated.len()),
                )
                .on_variable(column)
                .with_detail("count", duplicated.len())
                .with_detail("subjects", context.sample(duplicated.iter().copied())),
        ])
    }
}
