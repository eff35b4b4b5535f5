//! Concomitant/Prior Medications (CM).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;
use crate::transforms::is_na_value;

use super::common::{
    STATUS_MAP, ct_columns, date_pair, fill_from, map_string_column, normalize_durations,
    numeric_columns, present_col, replace_in, study_days,
};
use super::processor_trait::DomainProcessor;

pub(super) struct CmProcessor;

impl DomainProcessor for CmProcessor {
    fn domain_code(&self) -> &'static str {
        "CM"
    }

    fn description(&self) -> &'static str {
        "Dose numerics and units, decoded term fill, date pair, study days"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        date_pair(domain, df, "CMSTDTC", "CMENDTC")?;
        study_days(
            domain,
            df,
            context,
            &[("CMSTDTC", "CMSTDY"), ("CMENDTC", "CMENDY")],
        )?;
        normalize_durations(domain, df, &["CMDUR"])?;

        fill_from(domain, df, "CMTRT", "CMDECOD")?;
        replace_in(domain, df, "CMSTAT", &STATUS_MAP)?;
        numeric_columns(domain, df, &["CMDOSE", "CMDOSTOT"])?;

        // An unknown dose unit is no unit at all
        if let Some(unit) = present_col(domain, df, "CMDOSU") {
            map_string_column(df, unit, |value| {
                let upper = value.to_uppercase();
                if is_na_value(value) || upper == "UNK" || upper == "UNKNOWN" {
                    String::new()
                } else {
                    value.to_string()
                }
            })?;
        }
        ct_columns(
            domain,
            df,
            context,
            &["CMDOSU", "CMDOSFRM", "CMDOSFRQ", "CMROUTE"],
        )?;
        Ok(())
    }
}
