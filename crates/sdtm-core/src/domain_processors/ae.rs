//! Adverse Events (AE).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;
use crate::transforms::assign_sequence;

use super::common::{
    col, ct_columns, date_pair, fill_from, normalize_durations, numeric_columns, present_col,
    replace_in, study_days, yes_no,
};
use super::processor_trait::DomainProcessor;

const OUTCOME_MAP: [(&str, &str); 9] = [
    ("RECOVERED", "RECOVERED/RESOLVED"),
    ("RESOLVED", "RECOVERED/RESOLVED"),
    ("NOT RECOVERED", "NOT RECOVERED/NOT RESOLVED"),
    ("NOT RESOLVED", "NOT RECOVERED/NOT RESOLVED"),
    ("RECOVERING", "RECOVERING/RESOLVING"),
    ("RESOLVING", "RECOVERING/RESOLVING"),
    ("RECOVERED WITH SEQUELAE", "RECOVERED/RESOLVED WITH SEQUELAE"),
    ("RESOLVED WITH SEQUELAE", "RECOVERED/RESOLVED WITH SEQUELAE"),
    ("DEATH", "FATAL"),
];

const SEVERITY_MAP: [(&str, &str); 6] = [
    ("GRADE 1", "MILD"),
    ("GRADE 2", "MODERATE"),
    ("GRADE 3", "SEVERE"),
    ("1", "MILD"),
    ("2", "MODERATE"),
    ("3", "SEVERE"),
];

const FLAG_COLUMNS: [&str; 8] = [
    "AESER", "AESCONG", "AESDISAB", "AESDTH", "AESHOSP", "AESLIFE", "AESMIE", "AESINTV",
];

const MEDDRA_CODES: [&str; 6] = [
    "AEPTCD", "AEHLGTCD", "AEHLTCD", "AELLTCD", "AESOCCD", "AEBDSYCD",
];

pub(super) struct AeProcessor;

impl DomainProcessor for AeProcessor {
    fn domain_code(&self) -> &'static str {
        "AE"
    }

    fn description(&self) -> &'static str {
        "Outcome and severity tables, seriousness flags, date pair, study days"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        // Dates and study days
        date_pair(domain, df, "AESTDTC", "AEENDTC")?;
        study_days(
            domain,
            df,
            context,
            &[("AESTDTC", "AESTDY"), ("AEENDTC", "AEENDY")],
        )?;
        normalize_durations(domain, df, &["AEDUR"])?;

        // Verbatim term stands in for a missing dictionary term
        fill_from(domain, df, "AETERM", "AEDECOD")?;

        replace_in(domain, df, "AEOUT", &OUTCOME_MAP)?;
        replace_in(domain, df, "AESEV", &SEVERITY_MAP)?;
        yes_no(domain, df, &FLAG_COLUMNS)?;
        ct_columns(
            domain,
            df,
            context,
            &["AEACN", "AEREL", "AEOUT", "AESEV", "AESER"],
        )?;
        numeric_columns(domain, df, &MEDDRA_CODES)?;

        // Source AESEQ values are not trusted
        if let Some(seq) = col(domain, "AESEQ") {
            assign_sequence(df, seq, present_col(domain, df, "USUBJID"))?;
        }
        Ok(())
    }
}
