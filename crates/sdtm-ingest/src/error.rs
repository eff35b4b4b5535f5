use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {}: {source}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read csv {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to build frame: {0}")]
    Frame(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
