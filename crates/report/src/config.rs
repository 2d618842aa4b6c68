//! Report configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ReportResult;

/// Color theme the report opens with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the reader's `prefers-color-scheme`
    #[default]
    Auto,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }
}

/// Report renderer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Document title
    pub title: String,

    /// Executive summary cards
    pub include_summary: bool,

    /// Per-violation cards
    pub include_violations: bool,

    /// Remediation guidance for known rules
    pub include_remediation: bool,

    /// Before/after code samples inside remediation guidance
    pub include_code_examples: bool,

    /// Help URL, rule id and raw tags on each card
    pub include_technical_details: bool,

    pub theme: Theme,

    /// Hide passing pages from the per-page list
    pub show_only_failures: bool,

    /// Group violation cards under principle headings
    pub group_by_category: bool,

    /// Also write a printable variant next to the interactive report
    pub generate_printable_version: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Accessibility Assessment Report".to_string(),
            include_summary: true,
            include_violations: true,
            include_remediation: true,
            include_code_examples: true,
            include_technical_details: true,
            theme: Theme::Auto,
            show_only_failures: false,
            group_by_category: true,
            generate_printable_version: false,
        }
    }
}

impl ReportConfig {
    /// Parse from YAML; omitted keys keep their defaults
    pub fn from_yaml(yaml: &str) -> ReportResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> ReportResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_yaml(&content)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.title, "Accessibility Assessment Report");
        assert!(config.include_summary);
        assert!(config.include_technical_details);
        assert_eq!(config.theme, Theme::Auto);
        assert!(!config.show_only_failures);
        assert!(config.group_by_category);
        assert!(!config.generate_printable_version);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ReportConfig::from_yaml(
            r#"
title: Checkout audit
theme: dark
show_only_failures: true
"#,
        )
        .unwrap();
        assert_eq!(config.title, "Checkout audit");
        assert_eq!(config.theme, Theme::Dark);
        assert!(config.show_only_failures);
        assert!(config.include_remediation);
    }

    #[test]
    fn test_invalid_theme_is_rejected() {
        assert!(ReportConfig::from_yaml("theme: sepia").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::load(&dir.path().join("report.yaml")).unwrap();
        assert_eq!(config, ReportConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.yaml");
        std::fs::write(&path, "generate_printable_version: true\n").unwrap();
        let config = ReportConfig::load(&path).unwrap();
        assert!(config.generate_printable_version);
    }
}
