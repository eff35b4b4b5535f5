use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use sdtm_core::compare_dates;
use sdtm_model::{IssueCategory, Severity, ValidationIssue, VariableType};

use crate::context::ValidationContext;
use crate::engine::ValidationRule;
use crate::error::RuleError;

/// `DOMAIN` equals the dataset's code in every record.
pub struct DomainCode;

impl ValidationRule for DomainCode {
    fn id(&self) -> &'static str {
        "CONSISTENCY.DOMAIN_CODE"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Consistency
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let Some(column) = context.column("DOMAIN") else {
            return Ok(Vec::new());
        };
        let values = context.strings(column)?;
        let wrong: Vec<&str> = values
            .iter()
            .map(String::as_str)
            .filter(|value| *value != context.code())
            .collect();
        if wrong.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![
            context
                .issue(
                    self.id(),
                    Severity::Error,
                    self.category(),
                    format!("DOMAIN is not {} in {} record(s)", context.code(), wrong.len()),
                )
                .on_variable(column)
                .with_detail("count", wrong.len())
                .with_detail("values", context.sample(wrong.iter().copied())),
        ])
    }
}

/// `--SEQ` is unique within each subject.
pub struct SequenceUnique;

impl ValidationRule for SequenceUnique {
    fn id(&self) -> &'static str {
        "CONSISTENCY.SEQ_UNIQUE"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Consistency
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        if context.options.is_sequence_exempt(context.code()) {
            return Ok(Vec::new());
        }
        let Some(seq_col) = context
            .domain
            .infer_seq_column()
            .filter(|name| context.column(name).is_some())
        else {
            return Ok(Vec::new());
        };
        let Some(subject_col) = context.column("USUBJID") else {
            return Ok(Vec::new());
        };
        let subjects = context.strings(subject_col)?;
        let sequences = context.strings(seq_col)?;

        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut affected = BTreeSet::new();
        let mut duplicates = 0usize;
        for (subject, seq) in subjects.iter().zip(&sequences) {
            if subject.is_empty() || seq.is_empty() {
                continue;
            }
            if !seen.insert((subject.as_str(), seq.as_str())) {
                duplicates += 1;
                affected.insert(subject.as_str());
            }
        }
        if duplicates == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![
            context
                .issue(
                    self.id(),
                    Severity::Error,
                    self.category(),
                    format!(
                        "{seq_col} is not unique within USUBJID for {} subject(s)",
                        affected.len()
                    ),
                )
                .on_variable(seq_col)
                .with_detail("count", duplicates)
                .with_detail("subject_count", affected.len())
                .with_detail("subjects", context.sample(affected.iter().copied())),
        ])
    }
}

/// Start dates and days never fall after their end counterparts.
pub struct DateOrder;

impl DateOrder {
    fn date_pair(
        &self,
        context: &ValidationContext<'_>,
        start: &str,
        end: &str,
    ) -> Result<Option<ValidationIssue>, RuleError> {
        let (Some(start_col), Some(end_col)) = (context.column(start), context.column(end)) else {
            return Ok(None);
        };
        let starts = context.strings(start_col)?;
        let ends = context.strings(end_col)?;
        let subjects = context.subjects()?;
        let rows: Vec<usize> = (0..starts.len())
            .filter(|idx| compare_dates(&starts[*idx], &ends[*idx]) == Some(Ordering::Greater))
            .collect();
        Ok(self.order_issue(context, start_col, end_col, &rows, &subjects))
    }

    fn day_pair(
        &self,
        context: &ValidationContext<'_>,
        start: &str,
        end: &str,
    ) -> Result<Option<ValidationIssue>, RuleError> {
        let (Some(start_col), Some(end_col)) = (context.column(start), context.column(end)) else {
            return Ok(None);
        };
        let starts = context.numbers(start_col)?;
        let ends = context.numbers(end_col)?;
        let subjects = context.subjects()?;
        let rows: Vec<usize> = (0..starts.len())
            .filter(|idx| matches!((starts[*idx], ends[*idx]), (Some(s), Some(e)) if s > e))
            .collect();
        Ok(self.order_issue(context, start_col, end_col, &rows, &subjects))
    }

    fn order_issue(
        &self,
        context: &ValidationContext<'_>,
        start: &str,
        end: &str,
        rows: &[usize],
        subjects: &[String],
    ) -> Option<ValidationIssue> {
        if rows.is_empty() {
            return None;
        }
        Some(
            context
                .issue(
                    self.id(),
                    Severity::Error,
                    self.category(),
                    format!("{start} is after {end} in {} record(s)", rows.len()),
                )
                .on_variable(start)
                .with_detail("end_variable", end)
                .with_detail("count", rows.len())
                .with_detail(
                    "subjects",
                    context.sample(rows.iter().map(|idx| subjects[*idx].as_str())),
                ),
        )
    }
}

impl ValidationRule for DateOrder {
    fn id(&self) -> &'static str {
        "CONSISTENCY.DATE_ORDER"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Consistency
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let v = |suffix: &str| context.domain.prefixed(suffix);
        let mut issues = Vec::new();
        issues.extend(self.date_pair(context, &v("STDTC"), &v("ENDTC"))?);
        issues.extend(self.day_pair(context, &v("STDY"), &v("ENDY"))?);
        Ok(issues)
    }
}

/// Reference range low never exceeds high.
pub struct RangeOrder;

impl ValidationRule for RangeOrder {
    fn id(&self) -> &'static str {
        "CONSISTENCY.RANGE_ORDER"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Consistency
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let v = |suffix: &str| context.domain.prefixed(suffix);
        let mut issues = Vec::new();
        for (low, high) in [(v("STNRLO"), v("STNRHI")), (v("ORNRLO"), v("ORNRHI"))] {
            let (Some(low_col), Some(high_col)) = (context.column(&low), context.column(&high))
            else {
                continue;
            };
            let lows = context.numbers(low_col)?;
            let highs = context.numbers(high_col)?;
            let inverted = lows
                .iter()
                .zip(&highs)
                .filter(|pair| matches!(pair, (Some(lo), Some(hi)) if lo > hi))
                .count();
            if inverted > 0 {
                issues.push(
                    context
                        .issue(
                            self.id(),
                            Severity::Error,
                            self.category(),
                            format!("{low_col} exceeds {high_col} in {inverted} record(s)"),
                        )
                        .on_variable(low_col)
                        .with_detail("count", inverted),
                );
            }
        }
        Ok(issues)
    }
}

/// Study days skip zero: day 1 is the reference start, day -1 the day before.
pub struct StudyDayZero;

impl ValidationRule for StudyDayZero {
    fn id(&self) -> &'static str {
        "CONSISTENCY.STUDY_DAY_ZERO"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Consistency
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let mut issues = Vec::new();
        let day_vars = context.domain.variables.iter().filter(|var| {
            var.data_type == VariableType::Num && var.name.to_ascii_uppercase().ends_with("DY")
        });
        for variable in day_vars {
            let Some(column) = context.column(&variable.name) else {
                continue;
            };
            let zeros = context
                .numbers(column)?
                .into_iter()
                .filter(|value| *value == Some(0.0))
                .count();
            if zeros > 0 {
                issues.push(
                    context
                        .issue(
                            self.id(),
                            Severity::Error,
                            self.category(),
                            format!("{column} is 0 in {zeros} record(s)"),
                        )
                        .on_variable(column)
                        .with_detail("count", zeros),
                );
            }
        }
        Ok(issues)
    }
}

/// Each `--TESTCD` maps to exactly one `--TEST`.
pub struct PairedTest;

impl ValidationRule for PairedTest {
    fn id(&self) -> &'static str {
        "CONSISTENCY.PAIRED_TEST"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Consistency
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let testcd = context.domain.prefixed("TESTCD");
        let test = context.domain.prefixed("TEST");
        let (Some(code_col), Some(name_col)) = (context.column(&testcd), context.column(&test))
        else {
            return Ok(Vec::new());
        };
        let codes = context.strings(code_col)?;
        let names = context.strings(name_col)?;
        let mut names_by_code: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (code, name) in codes.iter().zip(&names) {
            if code.is_empty() || name.is_empty() {
                continue;
            }
            names_by_code
                .entry(code.as_str())
                .or_default()
                .insert(name.as_str());
        }
        Ok(names_by_code
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(code, names)| {
                let names: Vec<String> = names.into_iter().map(str::to_string).collect();
                context
                    .issue(
                        self.id(),
                        Severity::Error,
                        self.category(),
                        format!(
                            "{code_col} {code} maps to {} different {name_col} values",
                            names.len()
                        ),
                    )
                    .on_variable(code_col)
                    .with_detail("code", code)
                    .with_detail("count", names.len())
                    .with_detail("values", names)
            })
            .collect())
    }
}
