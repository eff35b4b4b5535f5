//! Disposition (DS).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{
    col, ct_columns, fill_from, normalize_dates, present_col, set_string_column, string_column,
    string_column_or_blank, study_days,
};
use super::processor_trait::DomainProcessor;

/// Keyword rules for a blank DSDECOD, checked in order against DSTERM.
const DECOD_KEYWORDS: [(&[&str], &str); 7] = [
    (&["SCREEN FAILURE"], "SCREEN FAILURE"),
    (&["FAILURE TO MEET"], "SCREEN FAILURE"),
    (&["WITHDRAW", "CONSENT"], "WITHDRAWAL OF CONSENT"),
    (&["WITHDRAW", "SUBJECT"], "WITHDRAWAL BY SUBJECT"),
    (&["LOST", "FOLLOW"], "LOST TO FOLLOW-UP"),
    (&["ADVERSE EVENT"], "ADVERSE EVENT"),
    (&["COMPLETE"], "COMPLETED"),
];

const DEFAULT_CATEGORY: &str = "DISPOSITION EVENT";

pub(super) struct DsProcessor;

impl DomainProcessor for DsProcessor {
    fn domain_code(&self) -> &'static str {
        "DS"
    }

    fn description(&self) -> &'static str {
        "Category default, decoded term from keywords, dates, study days"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        normalize_dates(domain, df, &["DSSTDTC", "DSDTC"])?;
        study_days(
            domain,
            df,
            context,
            &[("DSSTDTC", "DSSTDY"), ("DSDTC", "DSDY")],
        )?;

        if let (Some(decod), Some(term)) =
            (col(domain, "DSDECOD"), present_col(domain, df, "DSTERM"))
        {
            let terms = string_column(df, term)?;
            let mut decods = string_column_or_blank(df, Some(decod))?;
            for (decod, term) in decods.iter_mut().zip(&terms) {
                if decod.is_empty()
                    && let Some(keyword) = decod_from_term(term)
                {
                    *decod = keyword.to_string();
                }
            }
            set_string_column(df, decod, decods)?;
        }
        fill_from(domain, df, "DSTERM", "DSDECOD")?;

        if let Some(category) = col(domain, "DSCAT") {
            let values = string_column_or_blank(df, present_col(domain, df, "DSCAT"))?
                .into_iter()
                .map(|value| {
                    if value.is_empty() {
                        DEFAULT_CATEGORY.to_string()
                    } else {
                        value
                    }
                })
                .collect();
            set_string_column(df, category, values)?;
        }
        ct_columns(domain, df, context, &["DSCAT", "DSDECOD", "EPOCH"])?;
        Ok(())
    }
}

fn decod_from_term(term: &str) -> Option<&'static str> {
    let upper = term.to_uppercase();
    DECOD_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().all(|keyword| upper.contains(keyword)))
        .map(|(_, decod)| *decod)
}
