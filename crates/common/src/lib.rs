//! AccessLens Common Library
//!
//! Findings model, WCAG rule knowledge base, and the pure transformations
//! shared by the reporter and the audit orchestrator:
//!
//! - [`normalize`]: raw axe-core output into [`PageScanResult`]
//! - [`aggregate`]: page results into an [`AggregateReport`]
//! - [`rules`]: remediation metadata keyed by rule id

pub mod aggregate;
pub mod error;
pub mod normalize;
pub mod rules;
pub mod types;

// Re-export commonly used types
pub use aggregate::{classify_principles, compliance_score, resolve_impact, Aggregator};
pub use error::{Error, Result};
pub use normalize::{normalize, ScanContext};
pub use rules::RuleRegistry;
pub use types::*;

/// AccessLens version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
