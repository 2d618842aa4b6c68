//! Error types for accessibility audits

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npm install playwright @axe-core/playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Audit spec parse error: {0}")]
    SpecParse(String),

    #[error("Scan failed: {target} - {reason}")]
    ScanFailed { target: String, reason: String },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Common(#[from] accesslens_common::Error),

    #[error(transparent)]
    Report(#[from] accesslens_report::ReportError),
}

pub type E2eResult<T> = Result<T, E2eError>;
