//! Exposure (EX).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{
    ct_columns, date_pair, normalize_dates, normalize_durations, numeric_columns, study_days,
};
use super::processor_trait::DomainProcessor;

pub(super) struct ExProcessor;

impl DomainProcessor for ExProcessor {
    fn domain_code(&self) -> &'static str {
        "EX"
    }

    fn description(&self) -> &'static str {
        "Dose numerics, dosing codelists, date pair, study days"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        date_pair(domain, df, "EXSTDTC", "EXENDTC")?;
        normalize_dates(domain, df, &["EXRFTDTC"])?;
        study_days(
            domain,
            df,
            context,
            &[("EXSTDTC", "EXSTDY"), ("EXENDTC", "EXENDY")],
        )?;
        normalize_durations(domain, df, &["EXDUR", "EXELTM"])?;
        numeric_columns(domain, df, &["EXDOSE", "EXDOSTOT"])?;
        ct_columns(
            domain,
            df,
            context,
            &["EXDOSFRM", "EXDOSU", "EXDOSFRQ", "EXROUTE"],
        )?;
        Ok(())
    }
}
