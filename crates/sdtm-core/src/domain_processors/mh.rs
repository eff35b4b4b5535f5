//! Medical History (MH).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{
    ct_columns, date_pair, fill_from, normalize_dates, replace_in, study_days, yes_no,
};
use super::processor_trait::DomainProcessor;

/// Relative end reference spellings.
const END_RELATIVE_MAP: [(&str, &str); 9] = [
    ("Y", "ONGOING"),
    ("YES", "ONGOING"),
    ("TRUE", "ONGOING"),
    ("N", ""),
    ("NO", ""),
    ("PRIOR", "BEFORE"),
    ("POST", "AFTER"),
    ("CONCURRENT", "COINCIDENT"),
    ("UNK", "UNKNOWN"),
];

pub(super) struct MhProcessor;

impl DomainProcessor for MhProcessor {
    fn domain_code(&self) -> &'static str {
        "MH"
    }

    fn description(&self) -> &'static str {
        "Decoded term fill, occurrence flags, relative end reference, dates"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        date_pair(domain, df, "MHSTDTC", "MHENDTC")?;
        normalize_dates(domain, df, &["MHDTC"])?;
        study_days(
            domain,
            df,
            context,
            &[("MHDTC", "MHDY"), ("MHSTDTC", "MHSTDY"), ("MHENDTC", "MHENDY")],
        )?;

        fill_from(domain, df, "MHTERM", "MHDECOD")?;
        yes_no(domain, df, &["MHOCCUR", "MHPRESP"])?;
        replace_in(domain, df, "MHENRF", &END_RELATIVE_MAP)?;
        ct_columns(domain, df, context, &["MHENRF", "MHOCCUR", "MHPRESP"])?;
        Ok(())
    }
}
