pub mod domain;
pub mod enums;
pub mod error;
pub mod issue;
pub mod options;
pub mod provider;
pub mod terminology;

pub use domain::{DatasetClass, Domain, Variable, VariableType};
pub use enums::{CoreDesignation, VariableRole};
pub use error::{Result, SdtmError};
pub use issue::{IssueCategory, Severity, ValidationIssue};
pub use options::{
    CtMatchingMode, ProcessingOptions, SequenceAssignmentMode, UsubjidPrefixMode,
};
pub use provider::{CtResolver, SchemaProvider};
pub use terminology::{ControlledTerminology, CtCatalog, CtRegistry};
