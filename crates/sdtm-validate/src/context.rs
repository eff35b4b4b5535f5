//! What a rule sees while it runs.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;

use sdtm_core::ProcessedDomain;
use sdtm_core::frame::{numeric_column_f64, present_col, string_column};
use sdtm_model::{CtResolver, Domain, IssueCategory, Severity, ValidationIssue};

use crate::error::RuleError;
use crate::options::ValidationOptions;

/// One domain under validation plus read-only access to the whole study.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    pub study_id: &'a str,
    pub domain: &'a Domain,
    pub data: &'a DataFrame,
    pub study: &'a BTreeMap<String, ProcessedDomain>,
    pub ct: &'a dyn CtResolver,
    pub reference_starts: &'a BTreeMap<String, String>,
    pub options: &'a ValidationOptions,
}

impl<'a> ValidationContext<'a> {
    pub fn code(&self) -> &'a str {
        &self.domain.code
    }

    /// Frame column for a schema variable, if both exist.
    pub fn column(&self, name: &str) -> Option<&'a str> {
        present_col(self.domain, self.data, name)
    }

    pub fn strings(&self, column: &str) -> Result<Vec<String>, RuleError> {
        Ok(string_column(self.data, column)?)
    }

    pub fn numbers(&self, column: &str) -> Result<Vec<Option<f64>>, RuleError> {
        Ok(numeric_column_f64(self.data, column)?)
    }

    /// USUBJID per row, or blanks when the domain has none.
    pub fn subjects(&self) -> Result<Vec<String>, RuleError> {
        match self.column("USUBJID") {
            Some(column) => self.strings(column),
            None => Ok(vec![String::new(); self.data.height()]),
        }
    }

    /// Another domain of the study by code.
    pub fn other(&self, code: &str) -> Option<&'a ProcessedDomain> {
        self.study.get(&code.trim().to_uppercase())
    }

    /// Issue pre-filled with this domain's code.
    pub fn issue(
        &self,
        rule_id: &str,
        severity: Severity,
        category: IssueCategory,
        message: impl Into<String>,
    ) -> ValidationIssue {
        ValidationIssue::new(rule_id, severity, category, message).in_domain(self.code())
    }

    /// First `sample_limit` distinct values, in encounter order.
    pub fn sample<'v, I>(&self, values: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'v str>,
    {
        let mut seen = BTreeSet::new();
        values
            .into_iter()
            .filter(|value| !value.is_empty() && seen.insert(*value))
            .take(self.options.sample_limit)
            .map(str::to_string)
            .collect()
    }
}

/// USUBJID values of a processed domain.
pub(crate) fn domain_subjects(domain: &ProcessedDomain) -> Result<BTreeSet<String>, RuleError> {
    let Some(column) = present_col(&domain.domain, &domain.data, "USUBJID") else {
        return Ok(BTreeSet::new());
    };
    Ok(string_column(&domain.data, column)?
        .into_iter()
        .filter(|value| !value.is_empty())
        .collect())
}
