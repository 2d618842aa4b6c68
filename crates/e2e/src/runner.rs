//! Audit runner that orchestrates scanning, aggregation, rendering and persistence

use std::path::PathBuf;
use std::time::Instant;

use accesslens_common::{
    normalize, AggregateReport, Aggregator, ConformanceLevel, PageScanResult, RuleRegistry,
    ScanContext,
};
use accesslens_report::{ReportConfig, ReportRenderer};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::output::{PageDump, ReportArtifacts, ReportWriter};
use crate::playwright::PlaywrightConfig;
use crate::scanner::Scanner;
use crate::spec::{AuditSpec, PageTarget};

/// Outcome of scanning one target
#[derive(Debug, Clone)]
pub struct ScannedPage {
    pub target: PageTarget,
    /// Raw engine output, `None` when the scan failed
    pub raw: Option<Value>,
    pub result: PageScanResult,
}

/// Result of a full audit run
#[derive(Debug, Clone)]
pub struct AuditRun {
    pub report: AggregateReport,
    pub artifacts: ReportArtifacts,
    pub duration_ms: u64,
}

/// Configuration for the audit runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub playwright: PlaywrightConfig,
    pub report: ReportConfig,
    pub wcag_level: ConformanceLevel,
    pub specs_dir: PathBuf,
    pub output_dir: PathBuf,

    /// File stem for the report artifacts
    pub report_stem: String,

    /// Write `pages/NN-<name>.json` dumps
    pub write_page_dumps: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            playwright: PlaywrightConfig::default(),
            report: ReportConfig::default(),
            wcag_level: ConformanceLevel::AA,
            specs_dir: PathBuf::from("specs"),
            output_dir: PathBuf::from("accessibility-results"),
            report_stem: "accessibility-report".to_string(),
            write_page_dumps: true,
        }
    }
}

/// Main accessibility audit runner
pub struct AuditRunner<'a, S: Scanner> {
    scanner: S,
    rules: &'a RuleRegistry,
    config: RunnerConfig,
}

impl<'a, S: Scanner> AuditRunner<'a, S> {
    pub fn new(scanner: S, rules: &'a RuleRegistry, config: RunnerConfig) -> Self {
        Self {
            scanner,
            rules,
            config,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Audit every spec in the specs directory
    pub async fn run_all(&self) -> E2eResult<AuditRun> {
        let specs = AuditSpec::load_all(&self.config.specs_dir)?;
        self.run_detailed(&AuditSpec::targets_of(&specs)).await
    }

    /// Audit specs matching a tag
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<AuditRun> {
        let specs = AuditSpec::load_all(&self.config.specs_dir)?;
        let targets = AuditSpec::targets_of(AuditSpec::filter_by_tag(&specs, tag));
        self.run_detailed(&targets).await
    }

    /// Audit a specific spec by name
    pub async fn run_named(&self, name: &str) -> E2eResult<AuditRun> {
        let specs = AuditSpec::load_all(&self.config.specs_dir)?;
        let spec = AuditSpec::find_by_name(&specs, name)
            .ok_or_else(|| E2eError::SpecParse(format!("Audit not found: {}", name)))?;
        self.run_detailed(&spec.targets).await
    }

    /// Scan, aggregate, render and persist; returns the aggregate report
    pub async fn run(&self, targets: &[PageTarget]) -> E2eResult<AggregateReport> {
        Ok(self.run_detailed(targets).await?.report)
    }

    /// Like [`run`](Self::run), also reporting where artifacts were written
    pub async fn run_detailed(&self, targets: &[PageTarget]) -> E2eResult<AuditRun> {
        let start = Instant::now();
        info!("Auditing {} page(s)...", targets.len());

        let scanned = self.scan_all(targets).await;
        let pages: Vec<PageScanResult> = scanned.iter().map(|s| s.result.clone()).collect();

        let report = Aggregator::new(self.rules)
            .with_wcag_level(self.config.wcag_level)
            .aggregate(&pages);

        let renderer = ReportRenderer::new(self.rules, self.config.report.clone());
        let html = renderer.render(&report, &pages);
        let printable = self
            .config
            .report
            .generate_printable_version
            .then(|| renderer.render_printable(&report, &pages));

        let dumps: Vec<PageDump<'_>> = if self.config.write_page_dumps {
            scanned
                .iter()
                .map(|s| PageDump {
                    target: &s.target,
                    raw: s.raw.as_ref(),
                    normalized: &s.result,
                })
                .collect()
        } else {
            Vec::new()
        };

        let writer = ReportWriter::new(&self.config.output_dir, &self.config.report_stem);
        let artifacts = writer.write(&report, &html, printable.as_deref(), &dumps)?;

        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Audit Results: {} passed, {} failed, {} violation(s), compliance {}% ({} ms)",
            report.summary.passed_tests,
            report.summary.failed_tests,
            report.total_violations,
            report.summary.compliance_score,
            duration_ms
        );

        Ok(AuditRun {
            report,
            artifacts,
            duration_ms,
        })
    }

    /// Scan targets one at a time. A failed target becomes a scan-error page;
    /// it never stops the remaining targets.
    pub async fn scan_all(&self, targets: &[PageTarget]) -> Vec<ScannedPage> {
        let mut scanned = Vec::with_capacity(targets.len());
        for target in targets {
            scanned.push(self.scan_target(target).await);
        }
        scanned
    }

    async fn scan_target(&self, target: &PageTarget) -> ScannedPage {
        let start = Instant::now();
        debug!("Scanning {} ({})", target.name, target.url);

        let outcome = match self.scanner.scan(target).await {
            Ok(raw) => {
                let context = ScanContext::new(&target.url, &target.name);
                match normalize(&raw, context) {
                    Ok(result) => Ok((raw, result)),
                    Err(e) => Err((Some(raw), e.to_string())),
                }
            }
            Err(e) => Err((None, e.to_string())),
        };

        match outcome {
            Ok((raw, result)) => {
                let elapsed = start.elapsed().as_millis();
                if result.is_passing() {
                    info!("✓ {} ({} ms)", target.name, elapsed);
                } else {
                    info!("✗ {} - {} violation(s) ({} ms)", target.name, result.violations.len(), elapsed);
                }
                ScannedPage {
                    target: target.clone(),
                    raw: Some(raw),
                    result,
                }
            }
            Err((raw, reason)) => {
                warn!("✗ {} - scan failed: {}", target.name, reason);
                ScannedPage {
                    target: target.clone(),
                    raw,
                    result: PageScanResult::scan_failure(&target.url, &target.name, Utc::now(), reason),
                }
            }
        }
    }
}
