use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use sdtm_model::{
    ControlledTerminology, CtRegistry, CtResolver, Domain, Result, SchemaProvider, SdtmError,
};

use crate::ct_loader::load_ct_registry;
use crate::error::StandardsError;
use crate::loaders::load_domains;

/// Domain schemas plus controlled terminology, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct StandardsRegistry {
    domains: BTreeMap<String, Domain>,
    ct: CtRegistry,
}

impl StandardsRegistry {
    pub fn new(domains: Vec<Domain>, ct: CtRegistry) -> Self {
        let domains = domains
            .into_iter()
            .map(|domain| (domain.code.to_uppercase(), domain))
            .collect();
        Self { domains, ct }
    }

    /// Load from a standards root laid out as `<root>/sdtmig/` and `<root>/ct/`.
    pub fn load(root: &Path) -> std::result::Result<Self, StandardsError> {
        let domains = load_domains(&root.join("sdtmig"))?;
        let ct = load_ct_registry(&root.join("ct"))?;
        tracing::info!(
            root = %root.display(),
            domains = domains.len(),
            codelists = ct.codelist_count(),
            "standards loaded"
        );
        Ok(Self::new(domains, ct))
    }

    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.domains.values()
    }

    pub fn ct(&self) -> &CtRegistry {
        &self.ct
    }
}

impl SchemaProvider for StandardsRegistry {
    fn get_domain_schema(&self, code: &str) -> Result<Domain> {
        self.domains
            .get(&code.trim().to_uppercase())
            .cloned()
            .ok_or_else(|| SdtmError::UnknownDomain {
                code: code.to_string(),
            })
    }

    fn list_domain_codes(&self) -> BTreeSet<String> {
        self.domains.keys().cloned().collect()
    }
}

impl CtResolver for StandardsRegistry {
    fn resolve(
        &self,
        codelist_code: Option<&str>,
        variable: &str,
    ) -> Option<&ControlledTerminology> {
        self.ct.resolve(codelist_code, variable)
    }
}
