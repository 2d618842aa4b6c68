//! AccessLens Report Renderer
//!
//! Turns aggregated accessibility findings into a self-contained HTML
//! document. The interactive variant carries theme switching, client-side
//! filters and a JSON export of the [`AggregateReport`]; the printable variant
//! is static with every section expanded.
//!
//! ```no_run
//! use accesslens_common::{Aggregator, RuleRegistry};
//! use accesslens_report::{ReportConfig, ReportRenderer};
//!
//! let rules = RuleRegistry::builtin();
//! let pages = Vec::new();
//! let report = Aggregator::new(rules).aggregate(&pages);
//! let html = ReportRenderer::new(rules, ReportConfig::default()).render(&report, &pages);
//! # let _ = html;
//! ```
//!
//! [`AggregateReport`]: accesslens_common::AggregateReport

pub mod config;
pub mod error;
pub mod render;

pub use config::{ReportConfig, Theme};
pub use error::{ReportError, ReportResult};
pub use render::ReportRenderer;
