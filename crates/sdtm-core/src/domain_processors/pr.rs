//! Procedures (PR).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{
    ct_columns, date_pair, fill_from, normalize_dates, normalize_durations, numeric_columns,
    study_days,
};
use super::processor_trait::DomainProcessor;

pub(super) struct PrProcessor;

impl DomainProcessor for PrProcessor {
    fn domain_code(&self) -> &'static str {
        "PR"
    }

    fn description(&self) -> &'static str {
        "Decoded term fill, durations, timing reference, date pair"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        date_pair(domain, df, "PRSTDTC", "PRENDTC")?;
        normalize_dates(domain, df, &["PRRFTDTC"])?;
        study_days(
            domain,
            df,
            context,
            &[("PRSTDTC", "PRSTDY"), ("PRENDTC", "PRENDY")],
        )?;
        normalize_durations(domain, df, &["PRDUR", "PRELTM"])?;

        fill_from(domain, df, "PRTRT", "PRDECOD")?;
        numeric_columns(domain, df, &["PRDOSE", "PRTPTNUM"])?;
        ct_columns(
            domain,
            df,
            context,
            &["PRDECOD", "PRROUTE", "PRDOSFRM", "PRDOSU", "EPOCH"],
        )?;
        Ok(())
    }
}
