//! Physical Examination (PE).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{STATUS_MAP, replace_in, yes_no};
use super::findings::{FindingsRules, process_findings};
use super::processor_trait::DomainProcessor;

const RESULT_MAP: [(&str, &str); 5] = [
    ("NORM", "NORMAL"),
    ("WNL", "NORMAL"),
    ("WITHIN NORMAL LIMITS", "NORMAL"),
    ("ABN", "ABNORMAL"),
    ("ABNORM", "ABNORMAL"),
];

pub(super) struct PeProcessor;

impl DomainProcessor for PeProcessor {
    fn domain_code(&self) -> &'static str {
        "PE"
    }

    fn description(&self) -> &'static str {
        "Findings rules with normal/abnormal results"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        replace_in(domain, df, "PESTAT", &STATUS_MAP)?;
        replace_in(domain, df, "PEORRES", &RESULT_MAP)?;
        replace_in(domain, df, "PESTRESC", &RESULT_MAP)?;
        yes_no(domain, df, &["PECLSIG"])?;
        process_findings(
            domain,
            df,
            context,
            FindingsRules {
                numeric_result: false,
                ..FindingsRules::default()
            },
        )
    }
}
