//! Trial Summary (TS).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;
use crate::transforms::{assign_sequence, derive_test_from_testcd, ensure_paired_terms};

use super::common::{col, ct_columns, present_col, upper_columns};
use super::processor_trait::DomainProcessor;

pub(super) struct TsProcessor;

impl DomainProcessor for TsProcessor {
    fn domain_code(&self) -> &'static str {
        "TS"
    }

    fn description(&self) -> &'static str {
        "Parameter codes and names, TSSEQ per parameter"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        upper_columns(domain, df, &["TSPARMCD"])?;
        ct_columns(domain, df, context, &["TSPARMCD", "TSVCDREF"])?;

        let parmcd = present_col(domain, df, "TSPARMCD");
        if let (Some(parmcd), Some(parm)) = (parmcd, col(domain, "TSPARM")) {
            if let Some(ct) = context.resolve_ct(domain, "TSPARMCD") {
                derive_test_from_testcd(df, parmcd, parm, ct)?;
            }
            ensure_paired_terms(df, &domain.code, parmcd, parm)?;
        }

        // TS has no subjects; TSSEQ counts repeats of a parameter
        if let Some(seq) = col(domain, "TSSEQ") {
            assign_sequence(df, seq, parmcd)?;
        }
        Ok(())
    }
}
