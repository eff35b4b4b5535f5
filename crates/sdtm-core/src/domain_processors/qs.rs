//! Questionnaires (QS).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{STATUS_MAP, ct_columns, normalize_durations, replace_in};
use super::findings::{FindingsRules, process_findings};
use super::processor_trait::DomainProcessor;

pub(super) struct QsProcessor;

impl DomainProcessor for QsProcessor {
    fn domain_code(&self) -> &'static str {
        "QS"
    }

    fn description(&self) -> &'static str {
        "Findings rules for questionnaire items"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        replace_in(domain, df, "QSSTAT", &STATUS_MAP)?;
        normalize_durations(domain, df, &["QSELTM", "QSEVLINT"])?;
        ct_columns(domain, df, context, &["QSCAT"])?;
        process_findings(domain, df, context, FindingsRules::default())
    }
}
