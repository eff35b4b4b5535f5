use regex::Regex;

use sdtm_core::{is_iso8601_datetime, is_iso8601_duration, parse_numeric};
use sdtm_model::{IssueCategory, Severity, ValidationIssue, Variable, VariableType};

use crate::context::ValidationContext;
use crate::engine::ValidationRule;
use crate::error::RuleError;

/// Longest character value a transport file can hold.
const MAX_TEXT_LENGTH: usize = 200;

/// Non-blank values of `variable` rejected by `accept`, reported as one issue.
fn check_values(
    context: &ValidationContext<'_>,
    rule: &dyn ValidationRule,
    severity: Severity,
    variable: &Variable,
    what: &str,
    accept: impl Fn(&str) -> bool,
) -> Result<Option<ValidationIssue>, RuleError> {
    let Some(column) = context.column(&variable.name) else {
        return Ok(None);
    };
    let values = context.strings(column)?;
    let rejected: Vec<&str> = values
        .iter()
        .filter(|value| !value.is_empty() && !accept(value.as_str()))
        .map(String::as_str)
        .collect();
    if rejected.is_empty() {
        return Ok(None);
    }
    let sample = context.sample(rejected.iter().copied());
    Ok(Some(
        context
            .issue(
                rule.id(),
                severity,
                rule.category(),
                format!("{} has {} value(s) that are not {what}", variable.name, rejected.len()),
            )
            .on_variable(&variable.name)
            .with_detail("count", rejected.len())
            .with_detail("values", sample),
    ))
}

pub struct DateTimeFormat;

impl ValidationRule for DateTimeFormat {
    fn id(&self) -> &'static str {
        "FORMAT.ISO8601_DATETIME"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Format
    }

    fn description(&self) -> &'static str {
        "Date/time variables use ISO 8601, partial dates allowed"
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let mut issues = Vec::new();
        for variable in context.domain.variables.iter().filter(|var| var.is_datetime()) {
            issues.extend(check_values(
                context,
                self,
                Severity::Error,
                variable,
                "ISO 8601 date/times",
                is_iso8601_datetime,
            )?);
        }
        Ok(issues)
    }
}

pub struct DurationFormat;

impl ValidationRule for DurationFormat {
    fn id(&self) -> &'static str {
        "FORMAT.ISO8601_DURATION"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Format
    }

    fn description(&self) -> &'static str {
        "Duration variables use ISO 8601 durations"
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let mut issues = Vec::new();
        for variable in context.domain.variables.iter().filter(|var| var.is_duration()) {
            issues.extend(check_values(
                context,
                self,
                Severity::Error,
                variable,
                "ISO 8601 durations",
                is_iso8601_duration,
            )?);
        }
        Ok(issues)
    }
}

/// `--TESTCD` values: at most 8 characters, letter first, then letters, digits or `_`.
pub struct TestCodeName;

impl ValidationRule for TestCodeName {
    fn id(&self) -> &'static str {
        "FORMAT.TESTCD_NAME"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Format
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let Some(variable) = context.domain.variable(&context.domain.prefixed("TESTCD")) else {
            return Ok(Vec::new());
        };
        let pattern = Regex::new(r"^[A-Z][A-Z0-9_]{0,7}$")?;
        Ok(check_values(
            context,
            self,
            Severity::Warning,
            variable,
            "valid test codes",
            |value| pattern.is_match(value),
        )?
        .into_iter()
        .collect())
    }
}

/// Numeric variables hold numbers.
pub struct NumericValues;

impl ValidationRule for NumericValues {
    fn id(&self) -> &'static str {
        "FORMAT.NUMERIC"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Format
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let mut issues = Vec::new();
        let numeric = context
            .domain
            .variables
            .iter()
            .filter(|var| var.data_type == VariableType::Num);
        for variable in numeric {
            issues.extend(check_values(
                context,
                self,
                Severity::Error,
                variable,
                "numeric",
                |value| parse_numeric(value).is_some(),
            )?);
        }
        Ok(issues)
    }
}

pub struct TextLength;

impl ValidationRule for TextLength {
    fn id(&self) -> &'static str {
        "LIMIT.TEXT_LENGTH"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Limit
    }

    fn description(&self) -> &'static str {
        "Character values fit in 200 bytes"
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let mut issues = Vec::new();
        let character = context
            .domain
            .variables
            .iter()
            .filter(|var| var.data_type == VariableType::Char);
        for variable in character {
            issues.extend(check_values(
                context,
                self,
                Severity::Error,
                variable,
                "within 200 bytes",
                |value| value.len() <= MAX_TEXT_LENGTH,
            )?);
        }
        Ok(issues)
    }
}
