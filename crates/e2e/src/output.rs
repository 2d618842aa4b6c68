//! Report artifact persistence

use std::path::{Path, PathBuf};

use accesslens_common::{AggregateReport, PageScanResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::{E2eError, E2eResult};
use crate::spec::PageTarget;

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// File-system safe form of a test name: lowercase, runs of other characters
/// collapsed into `_`, no leading or trailing `_`.
pub fn sanitize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let collapsed = NON_ALPHANUMERIC.replace_all(&lowered, "_");
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        "page".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Per-target dump written next to the report
#[derive(Debug, Serialize)]
pub struct PageDump<'a> {
    pub target: &'a PageTarget,
    /// Scan engine output as received; absent when the scan failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<&'a Value>,
    pub normalized: &'a PageScanResult,
}

/// Paths of everything one audit run wrote
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportArtifacts {
    pub html: PathBuf,
    pub printable: Option<PathBuf>,
    pub json: PathBuf,
    pub pages: Vec<PathBuf>,
}

/// Writes report artifacts under one output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    stem: String,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            stem: stem.into(),
        }
    }

    pub fn html_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.html", self.stem))
    }

    pub fn printable_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}-printable.html", self.stem))
    }

    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.json", self.stem))
    }

    /// `pages/NN-<name>.json`, numbered from 1 in scan order
    pub fn page_dump_path(&self, index: usize, test_name: &str) -> PathBuf {
        self.output_dir
            .join("pages")
            .join(format!("{:02}-{}.json", index + 1, sanitize(test_name)))
    }

    /// Write the report document, its optional printable variant, the JSON
    /// export, and one dump per page. Any failure aborts the write.
    pub fn write(
        &self,
        report: &AggregateReport,
        html: &str,
        printable: Option<&str>,
        dumps: &[PageDump<'_>],
    ) -> E2eResult<ReportArtifacts> {
        create_dir(&self.output_dir)?;

        let mut artifacts = ReportArtifacts {
            html: self.html_path(),
            printable: None,
            json: self.json_path(),
            pages: Vec::new(),
        };

        write_file(&artifacts.html, html)?;

        if let Some(printable) = printable {
            let path = self.printable_path();
            write_file(&path, printable)?;
            artifacts.printable = Some(path);
        }

        write_file(&artifacts.json, &report.to_json()?)?;

        if !dumps.is_empty() {
            create_dir(&self.output_dir.join("pages"))?;
        }
        for (index, dump) in dumps.iter().enumerate() {
            let path = self.page_dump_path(index, &dump.normalized.test_name);
            write_file(&path, &serde_json::to_string_pretty(dump)?)?;
            artifacts.pages.push(path);
        }

        info!("Report written to: {}", artifacts.html.display());
        Ok(artifacts)
    }
}

fn create_dir(path: &Path) -> E2eResult<()> {
    std::fs::create_dir_all(path).map_err(|source| E2eError::Persist {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> E2eResult<()> {
    std::fs::write(path, contents).map_err(|source| E2eError::Persist {
        path: path.to_path_buf(),
        source,
    })
}
