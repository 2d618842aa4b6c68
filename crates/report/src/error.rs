//! Error types for report generation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid report configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
