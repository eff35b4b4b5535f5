//! Rule engine: runs every registered rule against one domain at a time.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info_span, warn};

use sdtm_core::ProcessedDomain;
use sdtm_model::{CtResolver, IssueCategory, Severity, ValidationIssue};

use crate::context::ValidationContext;
use crate::error::RuleError;
use crate::options::ValidationOptions;
use crate::rules::default_rules;

/// Rule id of the issue emitted in place of a rule that failed to run.
pub const RULE_FAILED_ID: &str = "ENGINE.RULE_FAILED";

/// One independently registrable check.
pub trait ValidationRule: Send + Sync {
    /// Stable identifier, e.g. `CONSISTENCY.SEQ_UNIQUE`.
    fn id(&self) -> &'static str;

    fn category(&self) -> IssueCategory;

    fn description(&self) -> &'static str {
        ""
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Result<Vec<ValidationIssue>, RuleError>;
}

pub struct RuleEngine {
    rules: Vec<Box<dyn ValidationRule>>,
    options: ValidationOptions,
}

impl RuleEngine {
    /// Engine with no rules.
    pub fn new(options: ValidationOptions) -> Self {
        Self {
            rules: Vec::new(),
            options,
        }
    }

    /// Engine with every built-in rule family registered.
    pub fn with_default_rules(options: ValidationOptions) -> Self {
        let mut engine = Self::new(options);
        for rule in default_rules() {
            engine.register(rule);
        }
        engine
    }

    pub fn register(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.id())
    }

    /// Run every rule; a failing rule yields one Warning in place of its output.
    pub fn validate_domain(&self, context: &ValidationContext<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for rule in &self.rules {
            match rule.evaluate(context) {
                Ok(found) => {
                    debug!(
                        domain_code = %context.code(),
                        rule = rule.id(),
                        issue_count = found.len(),
                        "rule evaluated"
                    );
                    issues.extend(found.into_iter().map(|issue| stamp_domain(issue, context)));
                }
                Err(error) => {
                    warn!(
                        domain_code = %context.code(),
                        rule = rule.id(),
                        error = %error,
                        "validation rule failed"
                    );
                    issues.push(
                        context
                            .issue(
                                RULE_FAILED_ID,
                                Severity::Warning,
                                IssueCategory::Structure,
                                format!("Rule {} could not be evaluated: {error}", rule.id()),
                            )
                            .with_detail("rule", rule.id())
                            .with_detail("error", error.to_string()),
                    );
                }
            }
        }
        issues
    }

    /// Validate every domain of a study; each domain sees all the others.
    pub fn validate_study(
        &self,
        study_id: &str,
        domains: &BTreeMap<String, ProcessedDomain>,
        ct: &dyn CtResolver,
        reference_starts: &BTreeMap<String, String>,
    ) -> BTreeMap<String, Vec<ValidationIssue>> {
        domains
            .par_iter()
            .map(|(code, processed)| {
                let _span = info_span!("validate_domain", domain_code = %code).entered();
                let context = ValidationContext {
                    study_id,
                    domain: &processed.domain,
                    data: &processed.data,
                    study: domains,
                    ct,
                    reference_starts,
                    options: &self.options,
                };
                (code.clone(), self.validate_domain(&context))
            })
            .collect()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_default_rules(ValidationOptions::default())
    }
}

fn stamp_domain(issue: ValidationIssue, context: &ValidationContext<'_>) -> ValidationIssue {
    if issue.domain.is_some() {
        issue
    } else {
        issue.in_domain(context.code())
    }
}
