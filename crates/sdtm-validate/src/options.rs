use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Domains without a per-subject `--SEQ`.
const SEQUENCE_EXEMPT_DOMAINS: [&str; 8] = ["DM", "SV", "TA", "TE", "TI", "TS", "TV", "RELREC"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Rewrite invalid values of non-extensible codelists before validating.
    pub repair_terminology: bool,
    pub sequence_exempt_domains: BTreeSet<String>,
    /// Offending values or subjects quoted per issue.
    pub sample_limit: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            repair_terminology: true,
            sequence_exempt_domains: SEQUENCE_EXEMPT_DOMAINS
                .iter()
                .map(|code| code.to_string())
                .collect(),
            sample_limit: 5,
        }
    }
}

impl ValidationOptions {
    pub fn is_sequence_exempt(&self, domain_code: &str) -> bool {
        self.sequence_exempt_domains
            .contains(&domain_code.trim().to_uppercase())
    }
}
