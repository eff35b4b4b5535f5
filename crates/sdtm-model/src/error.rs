use thiserror::Error;

/// Errors the core surfaces to its callers.
///
/// Everything else (invalid codelist values, ordering violations, blank
/// required fields) is reported as a [`crate::ValidationIssue`].
#[derive(Debug, Error)]
pub enum SdtmError {
    #[error("unknown domain: {code}")]
    UnknownDomain { code: String },

    #[error(
        "{domain}: {code_column}={code} is paired with conflicting {decode_column} values: {}",
        decodes.join(", ")
    )]
    PairedTermMismatch {
        domain: String,
        code_column: String,
        decode_column: String,
        code: String,
        decodes: Vec<String>,
    },

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, SdtmError>;
