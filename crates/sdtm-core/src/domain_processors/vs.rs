//! Vital Signs (VS).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{STATUS_MAP, ct_columns, normalize_durations, replace_in, upper_columns};
use super::findings::{FindingsRules, process_findings};
use super::processor_trait::DomainProcessor;

pub(super) struct VsProcessor;

impl DomainProcessor for VsProcessor {
    fn domain_code(&self) -> &'static str {
        "VS"
    }

    fn description(&self) -> &'static str {
        "Findings rules, body position, elapsed time"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        replace_in(domain, df, "VSSTAT", &STATUS_MAP)?;
        upper_columns(domain, df, &["VSPOS"])?;
        ct_columns(domain, df, context, &["VSPOS", "VSLOC", "VSLAT"])?;
        normalize_durations(domain, df, &["VSELTM"])?;
        process_findings(domain, df, context, FindingsRules::default())
    }
}
