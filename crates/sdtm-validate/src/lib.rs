//! Validation of normalized SDTM domains.
//!
//! A [`RuleEngine`] runs independent [`ValidationRule`]s against one domain
//! at a time. Every rule sees the domain's own frame plus read-only access
//! to every other domain of the study through [`ValidationContext`], which
//! is what the cross-reference rules need.

pub mod context;
pub mod engine;
pub mod error;
pub mod options;
pub mod repair;
pub mod report;
pub mod rules;

pub use context::ValidationContext;
pub use engine::{RULE_FAILED_ID, RuleEngine, ValidationRule};
pub use error::RuleError;
pub use options::ValidationOptions;
pub use repair::{REPAIRED_ID, repair_study_terminology, repair_terminology};
pub use rules::default_rules;
pub use report::{DomainReport, FailureEntry, StudyValidationReport, validate_outcome};
