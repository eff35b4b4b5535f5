use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::enums::{CoreDesignation, VariableRole};

/// Observation class of a domain (Interventions, Events, Findings, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetClass {
    Interventions,
    Events,
    Findings,
    FindingsAbout,
    SpecialPurpose,
    TrialDesign,
    StudyReference,
    Relationship,
}

impl DatasetClass {
    /// Findings and Findings About share the result-handling rules.
    pub fn is_findings(&self) -> bool {
        matches!(self, DatasetClass::Findings | DatasetClass::FindingsAbout)
    }

    /// Trial design datasets carry no subject identifiers.
    pub fn is_trial_design(&self) -> bool {
        matches!(self, DatasetClass::TrialDesign)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetClass::Interventions => "Interventions",
            DatasetClass::Events => "Events",
            DatasetClass::Findings => "Findings",
            DatasetClass::FindingsAbout => "Findings About",
            DatasetClass::SpecialPurpose => "Special-Purpose",
            DatasetClass::TrialDesign => "Trial Design",
            DatasetClass::StudyReference => "Study Reference",
            DatasetClass::Relationship => "Relationship",
        }
    }
}

impl fmt::Display for DatasetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DatasetClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', " ");
        match normalized.as_str() {
            "INTERVENTIONS" => Ok(DatasetClass::Interventions),
            "EVENTS" => Ok(DatasetClass::Events),
            "FINDINGS" => Ok(DatasetClass::Findings),
            "FINDINGS ABOUT" => Ok(DatasetClass::FindingsAbout),
            "SPECIAL PURPOSE" => Ok(DatasetClass::SpecialPurpose),
            "TRIAL DESIGN" => Ok(DatasetClass::TrialDesign),
            "STUDY REFERENCE" => Ok(DatasetClass::StudyReference),
            "RELATIONSHIP" => Ok(DatasetClass::Relationship),
            _ => Err(format!("Unknown dataset class: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableType {
    Char,
    Num,
}

/// One variable definition of a domain schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub label: Option<String>,
    pub data_type: VariableType,
    pub role: Option<VariableRole>,
    pub core: Option<CoreDesignation>,
    /// Codelist reference; may hold several codes separated by `;`.
    pub codelist_code: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
}

impl Variable {
    pub fn new(name: impl Into<String>, data_type: VariableType) -> Self {
        Self {
            name: name.into(),
            label: None,
            data_type,
            role: None,
            core: None,
            codelist_code: None,
            order: None,
        }
    }

    pub fn with_core(mut self, core: CoreDesignation) -> Self {
        self.core = Some(core);
        self
    }

    pub fn with_role(mut self, role: VariableRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_codelist(mut self, code: impl Into<String>) -> Self {
        self.codelist_code = Some(code.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.core == Some(CoreDesignation::Required)
    }

    /// ISO 8601 date/time variables (`--DTC`, `RF*DTC`, `BRTHDTC`, ...).
    pub fn is_datetime(&self) -> bool {
        let upper = self.name.to_ascii_uppercase();
        upper.ends_with("DTC") && self.data_type == VariableType::Char
    }

    /// ISO 8601 duration variables (`--DUR`, `--ELTM`, `--EVLINT`).
    pub fn is_duration(&self) -> bool {
        let upper = self.name.to_ascii_uppercase();
        self.data_type == VariableType::Char
            && (upper.ends_with("DUR") || upper.ends_with("ELTM") || upper.ends_with("EVLINT"))
    }
}

/// Domain schema: code, class tag and an ordered list of variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub code: String,
    pub description: Option<String>,
    pub class_name: Option<String>,
    #[serde(default)]
    pub dataset_class: Option<DatasetClass>,
    pub label: Option<String>,
    pub structure: Option<String>,
    pub variables: Vec<Variable>,
}

impl Domain {
    pub fn new(code: impl Into<String>, variables: Vec<Variable>) -> Self {
        Self {
            code: code.into().to_uppercase(),
            description: None,
            class_name: None,
            dataset_class: None,
            label: None,
            structure: None,
            variables,
        }
    }

    pub fn with_class(mut self, class: DatasetClass) -> Self {
        self.class_name = Some(class.as_str().to_string());
        self.dataset_class = Some(class);
        self
    }

    /// Return the variable name that matches a canonical SDTM name (case-insensitive).
    pub fn column_name(&self, canonical: &str) -> Option<&str> {
        self.variable(canonical).map(|variable| variable.name.as_str())
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables
            .iter()
            .find(|variable| variable.name.eq_ignore_ascii_case(name))
    }

    pub fn is_findings(&self) -> bool {
        self.dataset_class.is_some_and(|class| class.is_findings())
    }

    pub fn is_trial_design(&self) -> bool {
        self.dataset_class.is_some_and(|class| class.is_trial_design())
    }

    /// Domain-prefixed variable name, e.g. `prefixed("SEQ")` on AE is `AESEQ`.
    pub fn prefixed(&self, suffix: &str) -> String {
        format!("{}{}", self.code, suffix)
    }

    /// Sequence variable of the domain (`--SEQ`), if the schema declares one.
    pub fn infer_seq_column(&self) -> Option<&str> {
        let expected = self.prefixed("SEQ");
        if let Some(name) = self.column_name(&expected) {
            return Some(name);
        }
        let mut candidates: Vec<&str> = self
            .variables
            .iter()
            .map(|var| var.name.as_str())
            .filter(|name| {
                name.to_ascii_uppercase().ends_with("SEQ") && !name.eq_ignore_ascii_case("SEQ")
            })
            .collect();
        candidates.sort_by_key(|name| name.to_ascii_uppercase());
        candidates.first().copied()
    }

    pub fn required_variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(|variable| variable.is_required())
    }

    pub fn codelist_variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables
            .iter()
            .filter(|variable| variable.codelist_code.is_some())
    }

    /// Variables ordered by role (identifiers first, timing last), then by declared order.
    pub fn variables_by_role(&self) -> Vec<&Variable> {
        let mut ordered: Vec<&Variable> = self.variables.iter().collect();
        ordered.sort_by_key(|variable| {
            (
                variable.role.map(|role| role.sort_order()).unwrap_or(u8::MAX),
                variable.order.unwrap_or(u32::MAX),
            )
        });
        ordered
    }
}
