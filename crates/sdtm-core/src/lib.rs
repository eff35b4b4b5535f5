//! Domain normalization for SDTM datasets.
//!
//! Raw frames are normalized in place by a per-domain processor selected
//! from [`domain_processors::default_registry`]. [`process_study`] runs DM
//! first to build the reference start map, then every other domain in
//! parallel.

pub mod ct_utils;
pub mod datetime;
pub mod domain_processors;
pub mod duration;
pub mod frame;
pub mod pipeline_context;
pub mod processor;
pub mod study;
pub mod transforms;

pub use ct_utils::{compact_key, normalize_ct_value, resolve_ct_value};
pub use datetime::{
    DateTimeError, DateTimePrecision, Iso8601DateTime, compare_dates, is_iso8601_datetime,
    normalize_date, parse_date, parse_iso8601_datetime, study_day,
};
pub use domain_processors::{DomainProcessor, ProcessorRegistry, default_registry};
pub use duration::{
    DurationError, Iso8601Duration, is_iso8601_duration, normalize_duration,
    parse_iso8601_duration,
};
pub use pipeline_context::PipelineContext;
pub use processor::{process_domain, process_domain_with_registry};
pub use study::{
    DomainFailure, DomainFailureKind, ProcessedDomain, StudyOutcome, build_reference_starts,
    process_study,
};
pub use transforms::{
    apply_ct, assign_sequence, backward_fill, clean_na_values, clear_unit_when_empty,
    compute_study_day, ensure_date_pair_order, ensure_paired_terms, flag_last_observation,
    is_na_value, parse_numeric, replace_tokens,
};
