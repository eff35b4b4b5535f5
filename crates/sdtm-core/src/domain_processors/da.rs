//! Drug Accountability (DA).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{STATUS_MAP, present_col, replace_in, set_string_column, string_column};
use super::findings::{FindingsRules, process_findings};
use super::processor_trait::DomainProcessor;

pub(super) struct DaProcessor;

impl DomainProcessor for DaProcessor {
    fn domain_code(&self) -> &'static str {
        "DA"
    }

    fn description(&self) -> &'static str {
        "Findings rules, dispensed/returned counts, not-done status"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        replace_in(domain, df, "DASTAT", &STATUS_MAP)?;

        // A reason not done implies the status
        if let (Some(stat), Some(reason)) = (
            present_col(domain, df, "DASTAT"),
            present_col(domain, df, "DAREASND"),
        ) {
            let reasons = string_column(df, reason)?;
            let mut stats = string_column(df, stat)?;
            for (status, reason) in stats.iter_mut().zip(&reasons) {
                if status.is_empty() && !reason.is_empty() {
                    *status = "NOT DONE".to_string();
                }
            }
            set_string_column(df, stat, stats)?;
        }

        process_findings(
            domain,
            df,
            context,
            FindingsRules {
                last_observation: false,
                ..FindingsRules::default()
            },
        )
    }
}
