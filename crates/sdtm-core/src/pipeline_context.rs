//! Study-level inputs shared by every domain processor.

use std::collections::BTreeMap;

use sdtm_model::{ControlledTerminology, CtResolver, Domain, ProcessingOptions};

/// Read-only state handed to processors.
///
/// `reference_starts` maps USUBJID to the subject's RFSTDTC. It is empty
/// while DM itself is processed.
#[derive(Clone)]
pub struct PipelineContext<'a> {
    pub study_id: String,
    pub ct: &'a dyn CtResolver,
    pub reference_starts: BTreeMap<String, String>,
    pub options: ProcessingOptions,
}

impl<'a> PipelineContext<'a> {
    pub fn new(study_id: impl Into<String>, ct: &'a dyn CtResolver) -> Self {
        Self {
            study_id: study_id.into(),
            ct,
            reference_starts: BTreeMap::new(),
            options: ProcessingOptions::default(),
        }
    }

    pub fn with_reference_starts(mut self, reference_starts: BTreeMap<String, String>) -> Self {
        self.reference_starts = reference_starts;
        self
    }

    pub fn with_options(mut self, options: ProcessingOptions) -> Self {
        self.options = options;
        self
    }

    /// Codelist bound to `variable` in `domain`, falling back to a lookup by name.
    pub fn resolve_ct(&self, domain: &Domain, variable: &str) -> Option<&'a ControlledTerminology> {
        let codelist = domain
            .variable(variable)
            .and_then(|var| var.codelist_code.as_deref());
        let ct: &'a dyn CtResolver = self.ct;
        ct.resolve(codelist, variable)
    }
}
