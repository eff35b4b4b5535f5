//! Interfaces the core consumes from the standards layer.

use std::collections::BTreeSet;

use crate::domain::Domain;
use crate::error::Result;
use crate::terminology::ControlledTerminology;

/// Supplies domain schemas by code.
pub trait SchemaProvider: Send + Sync {
    /// Fails with [`crate::SdtmError::UnknownDomain`] when the code is not known.
    fn get_domain_schema(&self, code: &str) -> Result<Domain>;

    fn list_domain_codes(&self) -> BTreeSet<String>;
}

/// Resolves the codelist bound to a variable.
pub trait CtResolver: Send + Sync {
    fn resolve(
        &self,
        codelist_code: Option<&str>,
        variable: &str,
    ) -> Option<&ControlledTerminology>;
}
