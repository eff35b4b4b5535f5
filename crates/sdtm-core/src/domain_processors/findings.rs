//! Rules shared by the Findings-class processors (LB, VS, QS, PE, DA, IE).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;
use crate::transforms::{
    clean_na_values, clear_unit_when_empty, derive_numeric, derive_test_from_testcd,
    ensure_paired_terms, flag_last_observation,
};

use super::common::{col, ct_columns, date_pair, fill_from, present_col, study_days};

/// Which optional findings steps a processor wants.
#[derive(Debug, Clone, Copy)]
pub(super) struct FindingsRules {
    /// Derive `--STRESN` from `--STRESC`.
    pub numeric_result: bool,
    /// Maintain `--LOBXFL` per subject, test and position.
    pub last_observation: bool,
}

impl Default for FindingsRules {
    fn default() -> Self {
        Self {
            numeric_result: true,
            last_observation: true,
        }
    }
}

pub(super) fn process_findings(
    domain: &Domain,
    df: &mut DataFrame,
    context: &PipelineContext,
    rules: FindingsRules,
) -> Result<()> {
    let v = |suffix: &str| domain.prefixed(suffix);
    let (dtc, endtc) = (v("DTC"), v("ENDTC"));
    let (testcd, orresu, stresu) = (v("TESTCD"), v("ORRESU"), v("STRESU"));

    date_pair(domain, df, &dtc, &endtc)?;
    study_days(
        domain,
        df,
        context,
        &[(dtc.as_str(), v("DY").as_str()), (endtc.as_str(), v("ENDY").as_str())],
    )?;

    fill_from(domain, df, &v("ORRES"), &v("STRESC"))?;
    fill_from(domain, df, &v("ORRESU"), &v("STRESU"))?;

    ct_columns(
        domain,
        df,
        context,
        &[testcd.as_str(), orresu.as_str(), stresu.as_str()],
    )?;
    for unit in [&orresu, &stresu] {
        if let Some(column) = present_col(domain, df, unit) {
            clean_na_values(df, column)?;
        }
    }
    for (result, unit) in [(v("ORRES"), v("ORRESU")), (v("STRESC"), v("STRESU"))] {
        if let (Some(result), Some(unit)) =
            (present_col(domain, df, &result), present_col(domain, df, &unit))
        {
            clear_unit_when_empty(df, result, unit)?;
        }
    }

    if rules.numeric_result
        && let (Some(stresc), Some(stresn)) =
            (present_col(domain, df, &v("STRESC")), col(domain, &v("STRESN")))
    {
        derive_numeric(df, stresc, stresn)?;
    }

    if let (Some(testcd_col), Some(test_col)) =
        (present_col(domain, df, &testcd), col(domain, &v("TEST")))
    {
        if let Some(ct) = context.resolve_ct(domain, &testcd) {
            derive_test_from_testcd(df, testcd_col, test_col, ct)?;
        }
        ensure_paired_terms(df, &domain.code, testcd_col, test_col)?;
    }

    if rules.last_observation
        && let Some(flag) = col(domain, &v("LOBXFL"))
    {
        let position = v("POS");
        let keys: Vec<&str> = ["USUBJID", testcd.as_str(), position.as_str()]
            .into_iter()
            .filter_map(|name| present_col(domain, df, name))
            .collect();
        flag_last_observation(df, flag, &keys)?;
    }
    Ok(())
}
