//! Study-level aggregation and the JSON report.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use sdtm_core::{DomainFailure, StudyOutcome};
use sdtm_model::{CtResolver, Severity, ValidationIssue};

use crate::engine::RuleEngine;
use crate::repair::repair_study_terminology;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainReport {
    pub domain_code: String,
    pub records: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub issues: Vec<ValidationIssue>,
}

impl DomainReport {
    pub fn new(
        domain_code: impl Into<String>,
        records: usize,
        issues: Vec<ValidationIssue>,
    ) -> Self {
        let count = |severity: Severity| {
            issues
                .iter()
                .filter(|issue| issue.severity == severity)
                .count()
        };
        Self {
            domain_code: domain_code.into(),
            records,
            error_count: count(Severity::Error),
            warning_count: count(Severity::Warning),
            info_count: count(Severity::Info),
            issues,
        }
    }
}

/// A domain that never reached validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEntry {
    pub domain_code: String,
    pub kind: String,
    pub message: String,
}

impl From<&DomainFailure> for FailureEntry {
    fn from(failure: &DomainFailure) -> Self {
        Self {
            domain_code: failure.domain_code.clone(),
            kind: failure.kind.as_str().to_string(),
            message: failure.message.clone(),
        }
    }
}

/// Validation results for a whole study.
///
/// `success` only reflects processing failures; Error-severity issues are
/// for review and leave it untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyValidationReport {
    pub study_id: String,
    pub success: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub domains: Vec<DomainReport>,
    pub failures: Vec<FailureEntry>,
}

impl StudyValidationReport {
    pub fn new(
        study_id: impl Into<String>,
        domains: Vec<DomainReport>,
        failures: Vec<FailureEntry>,
    ) -> Self {
        let total =
            |pick: fn(&DomainReport) -> usize| -> usize { domains.iter().map(pick).sum() };
        Self {
            study_id: study_id.into(),
            success: failures.is_empty(),
            error_count: total(|report| report.error_count),
            warning_count: total(|report| report.warning_count),
            info_count: total(|report| report.info_count),
            domains,
            failures,
        }
    }

    pub fn domain(&self, code: &str) -> Option<&DomainReport> {
        self.domains
            .iter()
            .find(|report| report.domain_code.eq_ignore_ascii_case(code))
    }

    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.domains.iter().flat_map(|report| report.issues.iter())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize validation report")
    }

    pub fn write_json_report(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create report directory {}", parent.display()))?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("write validation report {}", path.display()))?;
        info!(path = %path.display(), "validation report written");
        Ok(())
    }
}

/// Repair terminology (when enabled), validate every processed domain and
/// fold processing failures into one report.
pub fn validate_outcome(
    study_id: &str,
    outcome: &mut StudyOutcome,
    ct: &dyn CtResolver,
    engine: &RuleEngine,
) -> Result<StudyValidationReport> {
    let span = info_span!("validate", study_id);
    let _guard = span.enter();

    let mut issues_by_domain: BTreeMap<String, Vec<ValidationIssue>> =
        if engine.options().repair_terminology {
            repair_study_terminology(&mut outcome.domains, ct)?
        } else {
            BTreeMap::new()
        };
    let validated =
        engine.validate_study(study_id, &outcome.domains, ct, &outcome.reference_starts);
    for (code, issues) in validated {
        issues_by_domain.entry(code).or_default().extend(issues);
    }

    let domains = outcome
        .domains
        .iter()
        .map(|(code, processed)| {
            let issues = issues_by_domain.remove(code).unwrap_or_default();
            DomainReport::new(code.clone(), processed.data.height(), issues)
        })
        .collect();
    let failures = outcome.failures.iter().map(FailureEntry::from).collect();
    let report = StudyValidationReport::new(study_id, domains, failures);
    info!(
        errors = report.error_count,
        warnings = report.warning_count,
        "validation finished"
    );
    Ok(report)
}
