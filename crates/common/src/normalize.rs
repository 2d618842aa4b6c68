//! Scan result normalization
//!
//! Converts the loosely typed axe-core payload into [`PageScanResult`]. Nothing
//! past this module sees raw JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{
    AffectedElement, Finding, Impact, PageScanResult, MISSING_HTML_PLACEHOLDER, UNKNOWN_RULE_ID,
};

/// Separator for nested selector paths (iframes, shadow roots)
const NESTED_TARGET_SEPARATOR: &str = " >>> ";

/// Page identity supplied by the caller; values reported inside the raw
/// payload are ignored.
#[derive(Debug, Clone)]
pub struct ScanContext {
    pub url: String,
    pub test_name: String,
    pub timestamp: DateTime<Utc>,
}

impl ScanContext {
    pub fn new(url: impl Into<String>, test_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            test_name: test_name.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawResults {
    #[serde(default)]
    violations: Vec<RawEntry>,
    #[serde(default)]
    passes: Vec<RawEntry>,
    #[serde(default)]
    incomplete: Vec<RawEntry>,
    #[serde(default)]
    inapplicable: Vec<RawEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    impact: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    tags: Vec<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    help: Option<String>,
    #[serde(default)]
    help_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    nodes: Vec<RawNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    impact: Option<String>,
    #[serde(default)]
    target: Value,
    #[serde(default)]
    failure_summary: Option<String>,
}

/// Per-entry lists reported as `null` read as empty
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Normalize one page's raw scan output
pub fn normalize(raw: &Value, context: ScanContext) -> Result<PageScanResult> {
    if !raw.is_object() {
        return Err(Error::MalformedScan(format!(
            "expected a JSON object, got {}",
            value_kind(raw)
        )));
    }

    let results = RawResults::deserialize(raw)
        .map_err(|e| Error::MalformedScan(e.to_string()))?;

    let page = PageScanResult {
        url: context.url,
        test_name: context.test_name,
        timestamp: context.timestamp,
        violations: results.violations.into_iter().map(normalize_entry).collect(),
        passes: results.passes.into_iter().map(normalize_entry).collect(),
        incomplete: results.incomplete.into_iter().map(normalize_entry).collect(),
        inapplicable: results.inapplicable.into_iter().map(normalize_entry).collect(),
        error: None,
    };

    debug!(
        url = %page.url,
        violations = page.violations.len(),
        passes = page.passes.len(),
        "Normalized scan result"
    );

    Ok(page)
}

fn normalize_entry(entry: RawEntry) -> Finding {
    let id = entry
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_RULE_ID.to_string());

    Finding {
        impact: parse_impact(&id, entry.impact.as_deref()),
        tags: entry.tags,
        description: entry.description.unwrap_or_default(),
        help: entry.help.unwrap_or_default(),
        help_url: entry.help_url.unwrap_or_default(),
        nodes: entry.nodes.into_iter().map(|n| normalize_node(&id, n)).collect(),
        id,
    }
}

fn normalize_node(rule_id: &str, node: RawNode) -> AffectedElement {
    let html = match node.html {
        Some(html) if !html.is_empty() => html,
        _ => MISSING_HTML_PLACEHOLDER.to_string(),
    };

    AffectedElement {
        html,
        impact: parse_impact(rule_id, node.impact.as_deref()),
        target: normalize_target(&node.target),
        failure_summary: node.failure_summary.filter(|s| !s.is_empty()),
    }
}

/// Unrecognized impact strings stay unresolved; severity defaults are the
/// aggregator's job.
fn parse_impact(rule_id: &str, raw: Option<&str>) -> Option<Impact> {
    let raw = raw?;
    let impact = Impact::parse(raw);
    if impact.is_none() {
        debug!(rule = rule_id, impact = raw, "Unrecognized impact left unresolved");
    }
    impact
}

/// Accept a single selector, a list of selectors, or a list containing
/// nested selector paths.
fn normalize_target(target: &Value) -> Vec<String> {
    match target {
        Value::Null => Vec::new(),
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().filter_map(selector_from_item).collect(),
        other => vec![other.to_string()],
    }
}

fn selector_from_item(item: &Value) -> Option<String> {
    match item {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(path) => {
            let parts: Vec<String> = path.iter().filter_map(selector_from_item).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(NESTED_TARGET_SEPARATOR))
            }
        }
        other => Some(other.to_string()),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
