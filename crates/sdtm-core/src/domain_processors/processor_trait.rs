//! Domain processor trait and registry.
//!
//! The registry is a closed lookup table keyed by domain code with one
//! designated fallback for codes that have no bespoke rules.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use anyhow::Result;
use polars::prelude::DataFrame;
use sdtm_model::Domain;

use crate::pipeline_context::PipelineContext;

/// Domain-specific normalization rules.
///
/// `process` mutates the frame in place and must be idempotent: running it
/// again on its own output leaves the frame unchanged. Invalid values are
/// corrected or blanked; only hard invariant violations (such as
/// [`sdtm_model::SdtmError::PairedTermMismatch`]) are returned as errors.
pub trait DomainProcessor: Send + Sync {
    /// Upper-case domain code, or `*` for the fallback processor.
    fn domain_code(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "Domain processor"
    }

    fn process(&self, domain: &Domain, df: &mut DataFrame, context: &PipelineContext)
    -> Result<()>;
}

/// Processors indexed by domain code, with a fallback for unknown domains.
pub struct ProcessorRegistry {
    processors: BTreeMap<&'static str, Box<dyn DomainProcessor>>,
    default_processor: Box<dyn DomainProcessor>,
}

impl ProcessorRegistry {
    pub fn new(default_processor: Box<dyn DomainProcessor>) -> Self {
        Self {
            processors: BTreeMap::new(),
            default_processor,
        }
    }

    /// Register a processor, replacing any existing one for the same code.
    pub fn register(&mut self, processor: Box<dyn DomainProcessor>) {
        self.processors.insert(processor.domain_code(), processor);
    }

    /// Processor for a domain code (case-insensitive), else the fallback.
    pub fn get(&self, domain_code: &str) -> &dyn DomainProcessor {
        let code = domain_code.trim().to_uppercase();
        self.processors
            .get(code.as_str())
            .map(|processor| processor.as_ref())
            .unwrap_or(self.default_processor.as_ref())
    }

    /// Whether a bespoke processor exists for the code.
    pub fn contains(&self, domain_code: &str) -> bool {
        self.processors
            .contains_key(domain_code.trim().to_uppercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Registered domain codes in sorted order.
    pub fn domain_codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.processors.keys().copied()
    }
}

/// Fallback for domains without bespoke rules.
pub struct DefaultProcessor;

impl DomainProcessor for DefaultProcessor {
    fn domain_code(&self) -> &'static str {
        "*"
    }

    fn description(&self) -> &'static str {
        "Dates, durations and study days from the schema"
    }

    fn process(
        &self,
        domain: &Domain,
        df: &mut DataFrame,
        context: &PipelineContext,
    ) -> Result<()> {
        super::default::process_default(domain, df, context)
    }
}

/// Registry shared by every caller, built on first use.
static DEFAULT_REGISTRY: OnceLock<ProcessorRegistry> = OnceLock::new();

/// Registry with the AE, CM, DA, DM, DS, EX, IE, LB, MH, PE, PR, QS, SE,
/// TA, TE, TS and VS processors.
pub fn default_registry() -> &'static ProcessorRegistry {
    DEFAULT_REGISTRY.get_or_init(super::build_default_registry)
}
