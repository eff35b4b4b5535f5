//! Configuration options for domain processing.

use serde::{Deserialize, Serialize};

/// How raw values are matched against a codelist during processing.
///
/// Values that do not resolve are left for validation to report or repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CtMatchingMode {
    /// Registered synonyms only; unknown values are left as-is.
    #[default]
    Strict,
    /// Also match submission values ignoring case and punctuation.
    Lenient,
}

/// Mode for applying STUDYID prefixes to USUBJID values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UsubjidPrefixMode {
    Skip,
    #[default]
    Prefix,
}

/// Mode for assigning --SEQ values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SequenceAssignmentMode {
    /// Keep source sequence values.
    Skip,
    /// Regenerate 1..n per subject from row order.
    #[default]
    Assign,
}

/// Options controlling domain processing behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingOptions {
    pub usubjid_prefix: UsubjidPrefixMode,
    pub sequence_assignment: SequenceAssignmentMode,
    pub ct_matching: CtMatchingMode,
    /// Log a warning for every column whose values were rewritten.
    pub warn_on_rewrite: bool,
    /// ISO 3166 alpha-3 code for DM rows with a blank or unknown COUNTRY.
    #[serde(default)]
    pub default_country: Option<String>,
}

impl ProcessingOptions {
    /// Synonym-only codelist matching, and a warning for every rewritten column.
    pub fn strict() -> Self {
        Self {
            ct_matching: CtMatchingMode::Strict,
            warn_on_rewrite: true,
            ..Self::default()
        }
    }
}
