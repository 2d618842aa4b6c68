//! Core types for AccessLens

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rule id used for the synthetic finding recorded when a page cannot be scanned
pub const SCAN_ERROR_RULE_ID: &str = "scan-error";

/// Rule id given to raw entries that arrive without one
pub const UNKNOWN_RULE_ID: &str = "unknown-rule";

/// Stand-in for an affected element whose HTML snippet was not reported
pub const MISSING_HTML_PLACEHOLDER: &str = "HTML not available";

/// Severity of an accessibility issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Critical,
    Serious,
    Moderate,
    Minor,
}

impl Impact {
    /// All severities, most severe first
    pub const ALL: [Impact; 4] = [Impact::Critical, Impact::Serious, Impact::Moderate, Impact::Minor];

    /// Parse a scan-engine impact string. Anything unrecognized is unresolved.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Impact::Critical),
            "serious" => Some(Impact::Serious),
            "moderate" => Some(Impact::Moderate),
            "minor" => Some(Impact::Minor),
            _ => None,
        }
    }

    /// Lowercase identifier, used for CSS classes and filter values
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Critical => "critical",
            Impact::Serious => "serious",
            Impact::Moderate => "moderate",
            Impact::Minor => "minor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Impact::Critical => "Critical",
            Impact::Serious => "Serious",
            Impact::Moderate => "Moderate",
            Impact::Minor => "Minor",
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// WCAG principle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Principle {
    Perceivable,
    Operable,
    Understandable,
    Robust,
}

impl Principle {
    pub const ALL: [Principle; 4] = [
        Principle::Perceivable,
        Principle::Operable,
        Principle::Understandable,
        Principle::Robust,
    ];

    /// Lowercase identifier, doubles as the category id
    pub fn as_str(&self) -> &'static str {
        match self {
            Principle::Perceivable => "perceivable",
            Principle::Operable => "operable",
            Principle::Understandable => "understandable",
            Principle::Robust => "robust",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Principle::Perceivable => "Perceivable",
            Principle::Operable => "Operable",
            Principle::Understandable => "Understandable",
            Principle::Robust => "Robust",
        }
    }
}

impl std::fmt::Display for Principle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// WCAG conformance level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConformanceLevel {
    A,
    #[default]
    AA,
    AAA,
}

impl ConformanceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConformanceLevel::A => "A",
            ConformanceLevel::AA => "AA",
            ConformanceLevel::AAA => "AAA",
        }
    }

    /// Strictest level named by axe-style tags such as `wcag2a`, `wcag21aa` or `wcag2aaa`
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Option<Self> {
        tags.iter().filter_map(|t| Self::from_tag(t.as_ref())).max()
    }

    fn from_tag(tag: &str) -> Option<Self> {
        let rest = tag.strip_prefix("wcag")?;
        let letters = rest.trim_start_matches(|c: char| c.is_ascii_digit());
        if letters.len() == rest.len() {
            return None; // no version digits, e.g. "wcag-best-practice"
        }
        match letters {
            "a" => Some(ConformanceLevel::A),
            "aa" => Some(ConformanceLevel::AA),
            "aaa" => Some(ConformanceLevel::AAA),
            _ => None,
        }
    }
}

impl std::str::FromStr for ConformanceLevel {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(ConformanceLevel::A),
            "AA" => Ok(ConformanceLevel::AA),
            "AAA" => Ok(ConformanceLevel::AAA),
            _ => Err(format!("unknown WCAG level: {} (expected A, AA or AAA)", s)),
        }
    }
}

impl std::fmt::Display for ConformanceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Before/after code sample attached to a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExample {
    pub bad: String,
    pub good: String,
    pub description: String,
}

/// Remediation metadata for one accessibility check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub title: String,
    pub level: ConformanceLevel,
    pub principle: Principle,
    pub guideline: String,
    pub description: String,
    pub explanation: String,
    pub impact: Impact,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub remediation_steps: Vec<String>,
    #[serde(default)]
    pub code_examples: Vec<CodeExample>,
    #[serde(default)]
    pub testing_methods: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub common_mistakes: Vec<String>,
    #[serde(default)]
    pub user_impact: String,
}

/// Display metadata for a WCAG principle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: String,
}

/// One element on the page a finding applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedElement {
    pub html: String,
    pub impact: Option<Impact>,
    pub target: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_summary: Option<String>,
}

/// A normalized violation or pass for one rule on one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: String,
    /// `None` when the scan engine could not classify the finding
    pub impact: Option<Impact>,
    pub tags: Vec<String>,
    pub description: String,
    pub help: String,
    pub help_url: String,
    pub nodes: Vec<AffectedElement>,
}

/// Outcome of scanning a single page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageScanResult {
    pub url: String,
    pub test_name: String,
    pub timestamp: DateTime<Utc>,
    pub violations: Vec<Finding>,
    #[serde(default)]
    pub passes: Vec<Finding>,
    #[serde(default)]
    pub incomplete: Vec<Finding>,
    #[serde(default)]
    pub inapplicable: Vec<Finding>,
    /// Set when the page could not be scanned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageScanResult {
    /// Result for a page the scan engine could not process.
    ///
    /// The failure is recorded as a single critical `scan-error` violation so
    /// the page counts as failed and shows up in the report.
    pub fn scan_failure(
        url: impl Into<String>,
        test_name: impl Into<String>,
        timestamp: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Self {
        let url = url.into();
        let reason = reason.into();
        let finding = Finding {
            id: SCAN_ERROR_RULE_ID.to_string(),
            impact: Some(Impact::Critical),
            tags: vec![SCAN_ERROR_RULE_ID.to_string()],
            description: format!("Accessibility scan failed: {}", reason),
            help: "The page could not be scanned, so none of its content was verified".to_string(),
            help_url: String::new(),
            nodes: vec![AffectedElement {
                html: MISSING_HTML_PLACEHOLDER.to_string(),
                impact: Some(Impact::Critical),
                target: vec![url.clone()],
                failure_summary: Some(reason.clone()),
            }],
        };

        Self {
            url,
            test_name: test_name.into(),
            timestamp,
            violations: vec![finding],
            passes: Vec::new(),
            incomplete: Vec::new(),
            inapplicable: Vec::new(),
            error: Some(reason),
        }
    }

    /// A page passes when it has no violations
    pub fn is_passing(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of elements affected by violations on this page
    pub fn affected_element_count(&self) -> usize {
        self.violations.iter().map(|v| v.nodes.len()).sum()
    }
}

/// Per-principle violation counts. Classification is non-exclusive, so the
/// counts need not add up to the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipleBreakdown {
    pub perceivable: usize,
    pub operable: usize,
    pub understandable: usize,
    pub robust: usize,
}

impl PrincipleBreakdown {
    pub fn get(&self, principle: Principle) -> usize {
        match principle {
            Principle::Perceivable => self.perceivable,
            Principle::Operable => self.operable,
            Principle::Understandable => self.understandable,
            Principle::Robust => self.robust,
        }
    }

    pub fn increment(&mut self, principle: Principle) {
        match principle {
            Principle::Perceivable => self.perceivable += 1,
            Principle::Operable => self.operable += 1,
            Principle::Understandable => self.understandable += 1,
            Principle::Robust => self.robust += 1,
        }
    }
}

/// Pass/fail summary across all scanned pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    /// Percentage of pages with zero violations, 0-100
    pub compliance_score: u8,
    pub wcag_level: ConformanceLevel,
    pub principle_breakdown: PrincipleBreakdown,
}

/// Aggregate metrics over a set of scanned pages.
///
/// Derived entirely from `test_results` plus rule lookups; see
/// [`crate::aggregate::Aggregator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub timestamp: DateTime<Utc>,
    pub total_violations: usize,
    pub critical_violations: usize,
    pub serious_violations: usize,
    pub moderate_violations: usize,
    pub minor_violations: usize,
    pub pages_analyzed: usize,
    pub test_results: Vec<PageScanResult>,
    pub summary: Summary,
}

impl AggregateReport {
    /// Violation count for one severity bucket
    pub fn count_for(&self, impact: Impact) -> usize {
        match impact {
            Impact::Critical => self.critical_violations,
            Impact::Serious => self.serious_violations,
            Impact::Moderate => self.moderate_violations,
            Impact::Minor => self.minor_violations,
        }
    }

    /// Serialize to the machine-readable export format
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a previously exported report
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
