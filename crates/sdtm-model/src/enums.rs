//! Variable metadata enumerations parsed from the standards tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a variable within its domain.
///
/// The standards tables distinguish five qualifier subclasses; the pipeline
/// only cares whether a qualifier carries a result, so the rest collapse
/// into [`VariableRole::Qualifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableRole {
    Identifier,
    Topic,
    Qualifier,
    Result,
    Rule,
    Timing,
}

impl VariableRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableRole::Identifier => "Identifier",
            VariableRole::Topic => "Topic",
            VariableRole::Qualifier => "Qualifier",
            VariableRole::Result => "Result Qualifier",
            VariableRole::Rule => "Rule",
            VariableRole::Timing => "Timing",
        }
    }

    /// Column ordering rank: identifiers first, timing last.
    pub fn sort_order(&self) -> u8 {
        match self {
            VariableRole::Identifier => 1,
            VariableRole::Topic => 2,
            VariableRole::Result => 3,
            VariableRole::Qualifier => 4,
            VariableRole::Rule => 5,
            VariableRole::Timing => 6,
        }
    }
}

impl fmt::Display for VariableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VariableRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        match normalized.as_str() {
            "IDENTIFIER" => Ok(VariableRole::Identifier),
            "TOPIC" => Ok(VariableRole::Topic),
            "RESULT" | "RESULT QUALIFIER" => Ok(VariableRole::Result),
            "QUALIFIER" | "GROUPING QUALIFIER" | "SYNONYM QUALIFIER" | "RECORD QUALIFIER"
            | "VARIABLE QUALIFIER" => Ok(VariableRole::Qualifier),
            "RULE" => Ok(VariableRole::Rule),
            "TIMING" => Ok(VariableRole::Timing),
            _ => Err(format!("Unknown variable role: {s}")),
        }
    }
}

/// Requirement level of a variable (Req/Exp/Perm).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoreDesignation {
    /// Must be present and non-blank in every record.
    Required,
    Expected,
    Permissible,
}

impl CoreDesignation {
    /// Short code as it appears in the standards tables.
    pub fn as_code(&self) -> &'static str {
        match self {
            CoreDesignation::Required => "Req",
            CoreDesignation::Expected => "Exp",
            CoreDesignation::Permissible => "Perm",
        }
    }
}

impl fmt::Display for CoreDesignation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

impl FromStr for CoreDesignation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "REQ" | "REQUIRED" => Ok(CoreDesignation::Required),
            "EXP" | "EXPECTED" => Ok(CoreDesignation::Expected),
            "PERM" | "PERMISSIBLE" => Ok(CoreDesignation::Permissible),
            _ => Err(format!("Unknown core designation: {s}")),
        }
    }
}
