//! Trial Elements (TE).

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

use super::common::{normalize_durations, upper_columns};
use super::processor_trait::DomainProcessor;

pub(super) struct TeProcessor;

impl DomainProcessor for TeProcessor {
    fn domain_code(&self) -> &'static str {
        "TE"
    }

    fn description(&self) -> &'static str {
        "Element codes, planned durations"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        _context: &PipelineContext,
    ) -> Result<()> {
        upper_columns(domain, df, &["ETCD"])?;
        normalize_durations(domain, df, &["TEDUR"])
    }
}
