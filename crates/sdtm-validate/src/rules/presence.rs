use sdtm_model::{IssueCategory, Severity, ValidationIssue};

use crate::context::ValidationContext;
use crate::engine::ValidationRule;
use crate::error::RuleError;

/// Required variables must exist and be populated in every record.
pub struct RequiredValues;

impl ValidationRule for RequiredValues {
    fn id(&self) -> &'static str {
        "PRESENCE.REQUIRED"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Presence
    }

    fn description(&self) -> &'static str {
        "Required variables are present and non-blank"
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError> {
        let mut issues = Vec::new();
        let subjects = context.subjects()?;
        for variable in context.domain.required_variables() {
            let Some(column) = context.column(&variable.name) else {
                issues.push(
                    context
                        .issue(
                            self.id(),
                            Severity::Error,
                            self.category(),
                            format!("Required variable {} is missing", variable.name),
                        )
                        .on_variable(&variable.name)
                        .with_detail("missing_column", true)
                        .with_detail("count", context.data.height()),
                );
                continue;
            };
            let values = context.strings(column)?;
            let blank_rows: Vec<usize> = values
                .iter()
                .enumerate()
                .filter(|(_, value)| value.is_empty())
                .map(|(idx, _)| idx)
                .collect();
            if blank_rows.is_empty() {
                continue;
            }
            let sample = context.sample(blank_rows.iter().map(|idx| subjects[*idx].as_str()));
            issues.push(
                context
                    .issue(
                        self.id(),
                        Severity::Error,
                        self.category(),
                        format!(
                            "Required variable {} is blank in {} record(s)",
                            variable.name,
                            blank_rows.len()
                        ),
                    )
                    .on_variable(&variable.name)
                    .with_detail("count", blank_rows.len())
                    .with_detail("subjects", sample),
            );
        }
        Ok(issues)
    }
}
