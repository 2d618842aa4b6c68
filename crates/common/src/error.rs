//! Error types for AccessLens

use thiserror::Error;

/// Result type alias using AccessLens Error
pub type Result<T> = std::result::Result<T, Error>;

/// AccessLens error types
///
/// Rule lookups never produce an error: an unknown rule id is an `Option::None`
/// that callers resolve with defaults.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Rule catalog error: {0}")]
    Catalog(#[from] serde_yaml::Error),

    #[error("Malformed scan result: {0}")]
    MalformedScan(String),
}
