//! Study-level orchestration: DM first, then every other domain in parallel.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use polars::prelude::DataFrame;
use rayon::prelude::*;
use tracing::{error, info, info_span};

use sdtm_model::{CtResolver, Domain, ProcessingOptions, SchemaProvider, SdtmError};

use crate::frame::{present_col, string_column, string_column_or_blank};
use crate::pipeline_context::PipelineContext;
use crate::processor::process_domain;

/// A normalized domain and the schema it was processed against.
#[derive(Debug, Clone)]
pub struct ProcessedDomain {
    pub domain: Domain,
    pub data: DataFrame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainFailureKind {
    UnknownDomain,
    PairedTermMismatch,
    Other,
}

impl DomainFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainFailureKind::UnknownDomain => "unknown domain",
            DomainFailureKind::PairedTermMismatch => "paired term mismatch",
            DomainFailureKind::Other => "processing error",
        }
    }
}

impl fmt::Display for DomainFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A domain that could not be normalized; the rest of the study is unaffected.
#[derive(Debug, Clone)]
pub struct DomainFailure {
    pub domain_code: String,
    pub kind: DomainFailureKind,
    pub message: String,
}

impl DomainFailure {
    fn from_error(domain_code: &str, error: &anyhow::Error) -> Self {
        let kind = match error.downcast_ref::<SdtmError>() {
            Some(SdtmError::UnknownDomain { .. }) => DomainFailureKind::UnknownDomain,
            Some(SdtmError::PairedTermMismatch { .. }) => DomainFailureKind::PairedTermMismatch,
            _ => DomainFailureKind::Other,
        };
        Self {
            domain_code: domain_code.to_string(),
            kind,
            message: format!("{error:#}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudyOutcome {
    pub domains: BTreeMap<String, ProcessedDomain>,
    pub failures: Vec<DomainFailure>,
    /// USUBJID to the subject's reference start, taken from normalized DM.
    pub reference_starts: BTreeMap<String, String>,
}

impl StudyOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// USUBJID to RFSTDTC, falling back to RFXSTDTC; the first non-blank row wins.
pub fn build_reference_starts(domain: &Domain, df: &DataFrame) -> Result<BTreeMap<String, String>> {
    let mut starts = BTreeMap::new();
    let Some(usubjid) = present_col(domain, df, "USUBJID") else {
        return Ok(starts);
    };
    let subjects = string_column(df, usubjid)?;
    let rfstdtc = string_column_or_blank(df, present_col(domain, df, "RFSTDTC"))?;
    let rfxstdtc = string_column_or_blank(df, present_col(domain, df, "RFXSTDTC"))?;
    for ((subject, start), exposure_start) in subjects.into_iter().zip(rfstdtc).zip(rfxstdtc) {
        let reference = if start.is_empty() { exposure_start } else { start };
        if subject.is_empty() || reference.is_empty() {
            continue;
        }
        starts.entry(subject).or_insert(reference);
    }
    Ok(starts)
}

fn normalize_one(
    code: &str,
    mut data: DataFrame,
    schemas: &dyn SchemaProvider,
    context: &PipelineContext,
) -> Result<ProcessedDomain> {
    let domain = schemas.get_domain_schema(code)?;
    process_domain(&domain, &mut data, context)?;
    Ok(ProcessedDomain { domain, data })
}

/// Normalize every dataset of a study, keyed by domain code.
///
/// DM is processed first and alone; the reference start map it yields is
/// read-only for every other domain, which then run in parallel. A failing
/// domain is recorded in [`StudyOutcome::failures`] and never stops the others.
pub fn process_study(
    study_id: &str,
    mut datasets: BTreeMap<String, DataFrame>,
    schemas: &dyn SchemaProvider,
    ct: &dyn CtResolver,
    options: &ProcessingOptions,
) -> StudyOutcome {
    let span = info_span!("study", study_id, domains = datasets.len());
    let _guard = span.enter();

    let mut outcome = StudyOutcome::default();
    let base_context = PipelineContext::new(study_id, ct).with_options(options.clone());

    let dm_key = datasets
        .keys()
        .find(|code| code.trim().eq_ignore_ascii_case("DM"))
        .cloned();
    if let Some(dm) = dm_key.and_then(|key| datasets.remove(&key)) {
        let result = normalize_one("DM", dm, schemas, &base_context).and_then(|processed| {
            let starts = build_reference_starts(&processed.domain, &processed.data)?;
            Ok((processed, starts))
        });
        match result {
            Ok((processed, starts)) => {
                info!(subjects = starts.len(), "reference starts built from DM");
                outcome.reference_starts = starts;
                outcome.domains.insert("DM".to_string(), processed);
            }
            Err(err) => {
                error!(domain_code = "DM", error = %err, "domain processing failed");
                outcome.failures.push(DomainFailure::from_error("DM", &err));
            }
        }
    }

    let context = base_context.with_reference_starts(outcome.reference_starts.clone());
    let results: Vec<(String, Result<ProcessedDomain>)> = datasets
        .into_par_iter()
        .map(|(code, data)| {
            let code = code.trim().to_uppercase();
            let result = normalize_one(&code, data, schemas, &context);
            (code, result)
        })
        .collect();

    for (code, result) in results {
        match result {
            Ok(processed) => {
                outcome.domains.insert(code, processed);
            }
            Err(err) => {
                error!(domain_code = %code, error = %err, "domain processing failed");
                outcome.failures.push(DomainFailure::from_error(&code, &err));
            }
        }
    }
    outcome
        .failures
        .sort_by(|left, right| left.domain_code.cmp(&right.domain_code));
    info!(
        processed = outcome.domains.len(),
        failed = outcome.failures.len(),
        "study processing finished"
    );
    outcome
}
