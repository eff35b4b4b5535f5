//! Rules for domains without a bespoke processor.
//!
//! Everything is driven by the schema: date-like variables are normalized,
//! duration-like variables converted to ISO 8601, and every `--DY`,
//! `--STDY` and `--ENDY` derived from its date.

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{date_pair, normalize_dates, normalize_durations, study_days};

pub(super) fn process_default(
    domain: &Domain,
    df: &mut DataFrame,
    context: &PipelineContext,
) -> Result<()> {
    let v = |suffix: &str| domain.prefixed(suffix);
    let (stdtc, endtc) = (v("STDTC"), v("ENDTC"));
    date_pair(domain, df, &stdtc, &endtc)?;

    let dates: Vec<&str> = domain
        .variables
        .iter()
        .filter(|variable| variable.is_datetime())
        .map(|variable| variable.name.as_str())
        .collect();
    normalize_dates(domain, df, &dates)?;
    let durations: Vec<&str> = domain
        .variables
        .iter()
        .filter(|variable| variable.is_duration())
        .map(|variable| variable.name.as_str())
        .collect();
    normalize_durations(domain, df, &durations)?;

    let (dtc, dy, stdy, endy) = (v("DTC"), v("DY"), v("STDY"), v("ENDY"));
    study_days(
        domain,
        df,
        context,
        &[
            (dtc.as_str(), dy.as_str()),
            (stdtc.as_str(), stdy.as_str()),
            (endtc.as_str(), endy.as_str()),
        ],
    )
}
