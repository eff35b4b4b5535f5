//! Trial Arms (TA).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{ct_columns, numeric_columns, upper_columns};
use super::processor_trait::DomainProcessor;

pub(super) struct TaProcessor;

impl DomainProcessor for TaProcessor {
    fn domain_code(&self) -> &'static str {
        "TA"
    }

    fn description(&self) -> &'static str {
        "Arm and element codes, element order"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        upper_columns(domain, df, &["ARMCD", "ETCD"])?;
        numeric_columns(domain, df, &["TAETORD"])?;
        ct_columns(domain, df, context, &["EPOCH"])?;
        Ok(())
    }
}
