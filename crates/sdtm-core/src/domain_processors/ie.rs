//! Inclusion/Exclusion Criteria Not Met (IE).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{ct_columns, yes_no};
use super::findings::{FindingsRules, process_findings};
use super::processor_trait::DomainProcessor;

pub(super) struct IeProcessor;

impl DomainProcessor for IeProcessor {
    fn domain_code(&self) -> &'static str {
        "IE"
    }

    fn description(&self) -> &'static str {
        "Findings rules with Y/N criterion results"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        yes_no(domain, df, &["IEORRES", "IESTRESC"])?;
        ct_columns(domain, df, context, &["IECAT"])?;
        process_findings(
            domain,
            df,
            context,
            FindingsRules {
                numeric_result: false,
                last_observation: false,
            },
        )
    }
}
