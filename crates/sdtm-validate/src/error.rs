use thiserror::Error;

/// Why a rule could not produce its issues.
///
/// The engine never propagates these; each one becomes a single
/// `ENGINE.RULE_FAILED` warning for the domain.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Frame access failed; carries the full error chain.
    #[error("{0}")]
    Data(String),
}

impl From<anyhow::Error> for RuleError {
    fn from(err: anyhow::Error) -> Self {
        RuleError::Data(format!("{err:#}"))
    }
}
