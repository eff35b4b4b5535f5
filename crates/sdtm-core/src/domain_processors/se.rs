//! Subject Elements (SE).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{date_pair, study_days, upper_columns};
use super::processor_trait::DomainProcessor;

pub(super) struct SeProcessor;

impl DomainProcessor for SeProcessor {
    fn domain_code(&self) -> &'static str {
        "SE"
    }

    fn description(&self) -> &'static str {
        "Element codes, element date pair, study days"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        upper_columns(domain, df, &["ETCD"])?;
        date_pair(domain, df, "SESTDTC", "SEENDTC")?;
        study_days(
            domain,
            df,
            context,
            &[("SESTDTC", "SESTDY"), ("SEENDTC", "SEENDY")],
        )
    }
}
