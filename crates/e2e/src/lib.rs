//! AccessLens Accessibility Audit Framework
//!
//! This crate drives WCAG audits of live pages:
//! - Parses declarative YAML audit specs
//! - Scans each page with axe-core through Playwright (or any [`Scanner`])
//! - Normalizes and aggregates findings against the rule knowledge base
//! - Renders the HTML report and persists it with a JSON export
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Audit Runner (Rust)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  AuditRunner<S: Scanner>                                    │
//! │    ├── scan(target) -> raw JSON        (Scanner)            │
//! │    ├── normalize(raw) -> PageScanResult                     │
//! │    │      └── on failure: scan-error page, keep going       │
//! │    ├── aggregate(pages) -> AggregateReport                  │
//! │    ├── render(report) -> HTML (+ printable)                 │
//! │    └── write(report) -> ReportArtifacts  (fatal on error)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  AuditSpec (YAML)                                           │
//! │    ├── name, description, tags                              │
//! │    └── targets: [PageTarget]                                │
//! │          ├── name, url, wait_for_selector?                  │
//! │          └── axe_tags, include, exclude                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod output;
pub mod playwright;
pub mod runner;
pub mod scanner;
pub mod spec;

pub use error::{E2eError, E2eResult};
pub use output::{ReportArtifacts, ReportWriter};
pub use runner::{AuditRun, AuditRunner, RunnerConfig};
pub use scanner::Scanner;
pub use spec::{AuditSpec, PageTarget};
