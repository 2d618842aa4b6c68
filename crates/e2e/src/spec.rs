//! Declarative YAML audit specification

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::error::{E2eError, E2eResult};

/// A set of pages to audit, parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSpec {
    /// Unique name for this audit
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering audits
    #[serde(default)]
    pub tags: Vec<String>,

    /// Pages to scan, in order
    pub targets: Vec<PageTarget>,
}

/// One page to scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTarget {
    /// Logical test name shown in the report
    pub name: String,

    pub url: String,

    /// Wait for this selector after navigation, before scanning
    #[serde(default)]
    pub wait_for_selector: Option<String>,

    /// axe-core rule tags to run
    #[serde(default = "default_axe_tags")]
    pub axe_tags: Vec<String>,

    /// Restrict the scan to these selectors
    #[serde(default)]
    pub include: Vec<String>,

    /// Skip these selectors
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_axe_tags() -> Vec<String> {
    vec!["wcag2a".to_string(), "wcag2aa".to_string(), "wcag21aa".to_string()]
}

impl PageTarget {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            wait_for_selector: None,
            axe_tags: default_axe_tags(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl AuditSpec {
    /// Parse an audit spec from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parse an audit spec from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all audit specs from a directory tree, in file name order.
    ///
    /// A missing or unreadable directory is an error; an empty one only warns.
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                E2eError::SpecParse(format!("cannot read specs in {}: {}", dir.display(), e))
            })?;
            let is_yaml = entry
                .path()
                .extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false);
            if entry.file_type().is_file() && is_yaml {
                specs.push(Self::from_file(entry.path())?);
            }
        }

        if specs.is_empty() {
            warn!("No audit specs found in {}", dir.display());
        }

        Ok(specs)
    }

    /// Filter specs by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }

    /// Find a spec by name
    pub fn find_by_name<'a>(specs: &'a [Self], name: &str) -> Option<&'a Self> {
        specs.iter().find(|s| s.name == name)
    }

    /// Targets of several specs, flattened in order
    pub fn targets_of<'a>(specs: impl IntoIterator<Item = &'a Self>) -> Vec<PageTarget> {
        specs.into_iter().flat_map(|s| s.targets.iter().cloned()).collect()
    }

    fn validate(&self) -> E2eResult<()> {
        if self.name.trim().is_empty() {
            return Err(E2eError::SpecParse("audit name must not be empty".to_string()));
        }
        if self.targets.is_empty() {
            return Err(E2eError::SpecParse(format!("audit '{}' has no targets", self.name)));
        }
        for target in &self.targets {
            if target.url.trim().is_empty() {
                return Err(E2eError::SpecParse(format!(
                    "target '{}' in audit '{}' has no url",
                    target.name, self.name
                )));
            }
        }
        Ok(())
    }
}
