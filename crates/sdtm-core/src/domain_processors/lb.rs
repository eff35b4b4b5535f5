//! Laboratory Test Results (LB).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{STATUS_MAP, ct_columns, numeric_columns, replace_in, yes_no};
use super::findings::{FindingsRules, process_findings};
use super::processor_trait::DomainProcessor;

const RANGE_INDICATOR_MAP: [(&str, &str); 5] = [
    ("H", "HIGH"),
    ("L", "LOW"),
    ("N", "NORMAL"),
    ("ABN", "ABNORMAL"),
    ("WNL", "NORMAL"),
];

const QUALITATIVE_MAP: [(&str, &str); 4] = [
    ("POS", "POSITIVE"),
    ("POSITIVE", "POSITIVE"),
    ("NEG", "NEGATIVE"),
    ("NEGATIVE", "NEGATIVE"),
];

pub(super) struct LbProcessor;

impl DomainProcessor for LbProcessor {
    fn domain_code(&self) -> &'static str {
        "LB"
    }

    fn description(&self) -> &'static str {
        "Findings rules, reference range numerics and indicators"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        replace_in(domain, df, "LBSTAT", &STATUS_MAP)?;
        replace_in(domain, df, "LBNRIND", &RANGE_INDICATOR_MAP)?;
        yes_no(domain, df, &["LBCLSIG", "LBFAST"])?;
        ct_columns(domain, df, context, &["LBNRIND", "LBSPEC", "LBMETHOD"])?;

        process_findings(domain, df, context, FindingsRules::default())?;
        replace_in(domain, df, "LBSTRESC", &QUALITATIVE_MAP)?;
        numeric_columns(domain, df, &["LBSTNRLO", "LBSTNRHI"])?;
        Ok(())
    }
}
