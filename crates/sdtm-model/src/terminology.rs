//! Controlled terminology codelists and the registry that resolves them.

use std::collections::{BTreeMap, BTreeSet};

use rapidfuzz::distance::jaro_winkler;
use serde::{Deserialize, Serialize};

use crate::provider::CtResolver;

/// Minimum similarity for an approximate "did you mean" suggestion.
pub const SUGGESTION_CUTOFF: f64 = 0.85;
/// Queries shorter than this only receive exact matches.
const MIN_FUZZY_QUERY_LEN: usize = 6;
const MAX_CODE_TOKEN_LEN: usize = 12;

/// A single controlled-terminology codelist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlledTerminology {
    pub codelist_code: String,
    pub codelist_name: String,
    pub extensible: bool,
    pub submission_values: Vec<String>,
    /// Upper-cased synonym -> submission value.
    pub synonyms: BTreeMap<String, String>,
    /// Submission value -> synonyms as published, for display.
    pub submission_value_synonyms: BTreeMap<String, Vec<String>>,
    pub nci_codes: BTreeMap<String, String>,
    pub definitions: BTreeMap<String, String>,
    pub preferred_terms: BTreeMap<String, String>,
    pub sources: Vec<String>,
}

impl ControlledTerminology {
    pub fn new(code: impl Into<String>, name: impl Into<String>, extensible: bool) -> Self {
        Self {
            codelist_code: code.into(),
            codelist_name: name.into(),
            extensible,
            submission_values: Vec::new(),
            synonyms: BTreeMap::new(),
            submission_value_synonyms: BTreeMap::new(),
            nci_codes: BTreeMap::new(),
            definitions: BTreeMap::new(),
            preferred_terms: BTreeMap::new(),
            sources: Vec::new(),
        }
    }

    /// Add a submission value; duplicates are ignored.
    pub fn add_submission_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() && !self.submission_values.contains(&value) {
            self.submission_values.push(value);
        }
    }

    /// Register `synonym` as an alias of `submission_value`.
    pub fn add_synonym(&mut self, synonym: &str, submission_value: &str) {
        let trimmed = synonym.trim();
        if trimmed.is_empty() {
            return;
        }
        self.synonyms
            .insert(trimmed.to_uppercase(), submission_value.to_string());
        let display = self
            .submission_value_synonyms
            .entry(submission_value.to_string())
            .or_default();
        if !display.iter().any(|existing| existing == trimmed) {
            display.push(trimmed.to_string());
        }
    }

    /// Canonicalize a raw value through the synonym table.
    ///
    /// Only registered synonyms are rewritten; any other value is returned
    /// trimmed but otherwise unchanged.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self.synonyms.get(&trimmed.to_uppercase()) {
            Some(canonical) => canonical.clone(),
            None => trimmed.to_string(),
        }
    }

    pub fn is_valid(&self, value: &str) -> bool {
        self.submission_values.iter().any(|sv| sv == value)
    }

    /// Distinct non-blank raw values whose normalized form is not a submission value.
    ///
    /// Extensible codelists tolerate any value, so nothing is reported.
    pub fn invalid_values<'a, I>(&self, values: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut invalid = BTreeSet::new();
        if self.extensible {
            return invalid;
        }
        for raw in values {
            if raw.trim().is_empty() {
                continue;
            }
            if !self.is_valid(&self.normalize(raw)) {
                invalid.insert(raw.to_string());
            }
        }
        invalid
    }

    /// Values outside the enumerated set, reported even for extensible codelists.
    pub fn unrecognized_values<'a, I>(&self, values: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        values
            .into_iter()
            .filter(|raw| !raw.trim().is_empty())
            .filter(|raw| !self.is_valid(&self.normalize(raw)))
            .map(str::to_string)
            .collect()
    }

    /// Submission values close to `raw`, best match first.
    ///
    /// An exact hit on a submission value, synonym or preferred term is
    /// returned on its own. Approximate matching is only attempted for
    /// queries of at least six characters that do not look like a code.
    pub fn suggest_submission_values(&self, raw: &str, limit: usize) -> Vec<String> {
        let query = candidate_key(raw);
        if limit == 0 || query.is_empty() {
            return Vec::new();
        }
        let index = self.candidate_index();
        if let Some((_, target)) = index.iter().find(|(key, _)| *key == query) {
            return vec![target.clone()];
        }
        if query.chars().count() < MIN_FUZZY_QUERY_LEN || is_code_like(raw.trim()) {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &String)> = index
            .iter()
            .map(|(key, target)| (jaro_winkler::similarity(query.chars(), key.chars()), target))
            .filter(|(score, _)| *score >= SUGGESTION_CUTOFF)
            .collect();
        scored.sort_by(|left, right| right.0.total_cmp(&left.0).then_with(|| left.1.cmp(right.1)));

        let mut seen = BTreeSet::new();
        let mut suggestions = Vec::new();
        for (_, target) in scored {
            if seen.insert(target.as_str()) {
                suggestions.push(target.clone());
            }
            if suggestions.len() == limit {
                break;
            }
        }
        suggestions
    }

    /// Lexicographically smallest submission value.
    pub fn smallest_submission_value(&self) -> Option<&str> {
        self.submission_values.iter().map(String::as_str).min()
    }

    pub fn preferred_term_for(&self, value: &str) -> Option<&str> {
        self.preferred_terms.get(value).map(String::as_str)
    }

    pub fn nci_code_for(&self, value: &str) -> Option<&str> {
        self.nci_codes.get(value).map(String::as_str)
    }

    /// Submission value whose preferred term equals `term`, ignoring case.
    pub fn submission_value_for_term(&self, term: &str) -> Option<&str> {
        let wanted = candidate_key(term);
        self.preferred_terms
            .iter()
            .find(|(_, preferred)| candidate_key(preferred) == wanted)
            .map(|(value, _)| value.as_str())
    }

    fn candidate_index(&self) -> Vec<(String, String)> {
        let mut index = Vec::new();
        for value in &self.submission_values {
            index.push((candidate_key(value), value.clone()));
        }
        for (synonym, value) in &self.synonyms {
            index.push((candidate_key(synonym), value.clone()));
        }
        for (value, term) in &self.preferred_terms {
            index.push((candidate_key(term), value.clone()));
        }
        index.retain(|(key, _)| !key.is_empty());
        index
    }
}

/// Upper-case, single-spaced form with no padding around slashes.
fn candidate_key(value: &str) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .replace(" /", "/")
        .replace("/ ", "/")
        .to_uppercase()
}

/// Short code tokens such as `AESTDTC` or `MG/DL`.
fn is_code_like(value: &str) -> bool {
    !value.is_empty()
        && !value.contains(char::is_whitespace)
        && value.chars().count() <= MAX_CODE_TOKEN_LEN
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-' | '/'))
}

/// One published terminology package (e.g. "SDTM CT" 2024-03-29).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CtCatalog {
    pub label: String,
    pub version: Option<String>,
    /// Codelist code (upper-cased) -> codelist.
    pub by_code: BTreeMap<String, ControlledTerminology>,
    /// Codelist name or short name (upper-cased) -> codelist code.
    pub by_name: BTreeMap<String, String>,
}

impl CtCatalog {
    pub fn new(label: impl Into<String>, version: Option<String>) -> Self {
        Self {
            label: label.into(),
            version,
            ..Self::default()
        }
    }

    pub fn insert(&mut self, ct: ControlledTerminology) {
        let code = ct.codelist_code.to_uppercase();
        self.by_name
            .insert(ct.codelist_name.to_uppercase(), code.clone());
        self.by_code.insert(code, ct);
    }

    /// Register an additional lookup name (the codelist's short submission name).
    pub fn alias(&mut self, name: &str, code: &str) {
        if !name.trim().is_empty() {
            self.by_name
                .insert(name.trim().to_uppercase(), code.to_uppercase());
        }
    }

    pub fn get(&self, code: &str) -> Option<&ControlledTerminology> {
        self.by_code.get(&code.trim().to_uppercase())
    }

    fn by_variable(&self, variable: &str) -> Option<&ControlledTerminology> {
        self.by_name
            .get(&variable.trim().to_uppercase())
            .and_then(|code| self.by_code.get(code))
    }
}

/// All loaded catalogs, searched in priority order (SDTM CT first).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CtRegistry {
    pub catalogs: BTreeMap<String, CtCatalog>,
}

impl CtRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_catalog(&mut self, catalog: CtCatalog) {
        let key = catalog.label.to_uppercase();
        match self.catalogs.get_mut(&key) {
            Some(existing) => {
                existing.by_code.extend(catalog.by_code);
                existing.by_name.extend(catalog.by_name);
            }
            None => {
                self.catalogs.insert(key, catalog);
            }
        }
    }

    /// Convenience for a single-catalog registry built in memory.
    pub fn from_codelists(codelists: impl IntoIterator<Item = ControlledTerminology>) -> Self {
        let mut catalog = CtCatalog::new("SDTM CT", None);
        for ct in codelists {
            catalog.insert(ct);
        }
        let mut registry = Self::new();
        registry.add_catalog(catalog);
        registry
    }

    pub fn resolve_by_code(&self, code: &str) -> Option<&ControlledTerminology> {
        self.ordered_catalogs()
            .into_iter()
            .find_map(|catalog| catalog.get(code))
    }

    pub fn codelist_count(&self) -> usize {
        self.catalogs
            .values()
            .map(|catalog| catalog.by_code.len())
            .sum()
    }

    fn ordered_catalogs(&self) -> Vec<&CtCatalog> {
        let mut values: Vec<&CtCatalog> = self.catalogs.values().collect();
        values.sort_by_key(|catalog| catalog_sort_key(&catalog.label));
        values
    }
}

impl CtResolver for CtRegistry {
    fn resolve(
        &self,
        codelist_code: Option<&str>,
        variable: &str,
    ) -> Option<&ControlledTerminology> {
        let catalogs = self.ordered_catalogs();
        if let Some(raw) = codelist_code {
            for code in split_codelist_codes(raw) {
                if let Some(ct) = catalogs.iter().find_map(|catalog| catalog.get(&code)) {
                    return Some(ct);
                }
            }
        }
        catalogs
            .iter()
            .find_map(|catalog| catalog.by_variable(variable))
    }
}

fn catalog_sort_key(label: &str) -> (u8, String) {
    let upper = label.to_uppercase();
    let rank = match upper.as_str() {
        "SDTM CT" => 0,
        "SEND CT" => 1,
        _ => 2,
    };
    (rank, upper)
}

/// Split a multi-code reference such as `C66742; C66789`.
pub fn split_codelist_codes(raw: &str) -> Vec<String> {
    raw.split([';', ',', ' '])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
