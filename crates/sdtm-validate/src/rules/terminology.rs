use std::collections::BTreeSet;

use serde_json::{Map, Value};

use sdtm_model::{
    ControlledTerminology, IssueCategory, Severity, ValidationIssue, Variable, VariableType,
};

use crate::context::ValidationContext;
use crate::engine::ValidationRule;
use crate::error::RuleError;

const SUGGESTION_LIMIT: usize = 3;

/// Codelist-bound variables hold submission values.
///
/// Non-extensible codelists report invalid values as Errors. Extensible
/// codelists tolerate sponsor values, which are reported as Warnings.
pub struct CodelistValues;

impl CodelistValues {
    fn check(
        &self,
        context: &ValidationContext<'_>,
        variable: &Variable,
        ct: &ControlledTerminology,
    ) -> Result<Option<ValidationIssue>, RuleError> {
        let Some(column) = context.column(&variable.name) else {
            return Ok(None);
        };
        let values = context.strings(column)?;
        let raw = values.iter().map(String::as_str);
        let (offending, severity, what) = if ct.extensible {
            (ct.unrecognized_values(raw), Severity::Warning, "not in extensible codelist")
        } else {
            (ct.invalid_values(raw), Severity::Error, "not in codelist")
        };
        if offending.is_empty() {
            return Ok(None);
        }
        let count = values.iter().filter(|value| offending.contains(*value)).count();
        let mut suggestions = Map::new();
        for value in offending.iter().take(context.options.sample_limit) {
            let found = ct.suggest_submission_values(value, SUGGESTION_LIMIT);
            if !found.is_empty() {
                suggestions.insert(value.clone(), Value::from(found));
            }
        }
        let mut issue = context
            .issue(
                self.id(),
                severity,
                self.category(),
                format!(
                    "{} has {} value(s) {what} {} ({})",
                    variable.name,
                    offending.len(),
                    ct.codelist_code,
                    ct.codelist_name
                ),
            )
            .on_variable(&variable.name)
            .with_detail("codelist", ct.codelist_code.as_str())
            .with_detail("extensible", ct.extensible)
            .with_detail("count", count)
            .with_detail("values", context.sample(offending.iter().map(String::as_str)));
        if !suggestions.is_empty() {
            issue = issue.with_detail("suggestions", Value::Object(suggestions));
        }
        Ok(Some(issue))
    }
}

impl ValidationRule for CodelistValues {
    fn id(&self) -> &'static str {
        "TERMINOLOGY.CODELIST"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Terminology
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let mut issues = Vec::new();
        for variable in context
            .domain
            .codelist_variables()
            .filter(|var| var.data_type == VariableType::Char)
        {
            let Some(ct) = context
                .ct
                .resolve(variable.codelist_code.as_deref(), &variable.name)
            else {
                continue;
            };
            issues.extend(self.check(context, variable, ct)?);
        }
        Ok(issues)
    }
}

/// A code and its decode (`LBTESTCD`/`LBTEST`) name the same concept.
///
/// Both values are resolved to NCI concept codes through their own
/// codelists; rows where either side is unknown are left to
/// `TERMINOLOGY.CODELIST`.
pub struct PairedDecode;

impl ValidationRule for PairedDecode {
    fn id(&self) -> &'static str {
        "TERMINOLOGY.PAIRED_DECODE"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Terminology
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let mut issues = Vec::new();
        for code_var in context.domain.codelist_variables() {
            let upper = code_var.name.to_ascii_uppercase();
            let Some(decode_name) = upper.strip_suffix("CD") else {
                continue;
            };
            let Some(decode_var) = context
                .domain
                .variable(decode_name)
                .filter(|var| var.codelist_code.is_some())
            else {
                continue;
            };
            let (Some(code_col), Some(decode_col)) =
                (context.column(&code_var.name), context.column(&decode_var.name))
            else {
                continue;
            };
            let (Some(code_ct), Some(decode_ct)) = (
                context
                    .ct
                    .resolve(code_var.codelist_code.as_deref(), &code_var.name),
                context
                    .ct
                    .resolve(decode_var.codelist_code.as_deref(), &decode_var.name),
            ) else {
                continue;
            };

            let codes = context.strings(code_col)?;
            let decodes = context.strings(decode_col)?;
            let mut mismatched = BTreeSet::new();
            let mut count = 0usize;
            for (code, decode) in codes.iter().zip(&decodes) {
                let left = code_ct.nci_code_for(&code_ct.normalize(code));
                let right = decode_ct.nci_code_for(&decode_ct.normalize(decode));
                if let (Some(left), Some(right)) = (left, right)
                    && left != right
                {
                    count += 1;
                    mismatched.insert(format!("{code}/{decode}"));
                }
            }
            if count > 0 {
                issues.push(
                    context
                        .issue(
                            self.id(),
                            Severity::Error,
                            self.category(),
                            format!(
                                "{code_col} and {decode_col} name different terms in {count} record(s)"
                            ),
                        )
                        .on_variable(code_col)
                        .with_detail("decode_variable", decode_col)
                        .with_detail("count", count)
                        .with_detail(
                            "pairs",
                            context.sample(mismatched.iter().map(String::as_str)),
                        ),
                );
            }
        }
        Ok(issues)
    }
}
