//! WCAG rule knowledge base
//!
//! A read-only registry of remediation content keyed by axe-core rule id.
//! Consumers take a `&RuleRegistry`; [`RuleRegistry::builtin`] hands out the
//! shared instance built from the embedded catalog, and tests construct their
//! own with [`RuleRegistry::from_rules`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::types::{Category, ConformanceLevel, Impact, Principle, Rule};

/// Embedded WCAG rule catalog
const BUILTIN_CATALOG: &str = include_str!("../rules/wcag.yaml");

static BUILTIN: Lazy<RuleRegistry> = Lazy::new(|| {
    RuleRegistry::from_yaml(BUILTIN_CATALOG).expect("embedded rule catalog must parse")
});

/// On-disk shape of a rule catalog
#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    rules: Vec<Rule>,
}

/// Immutable rule lookup table
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    /// Rules in registration order
    rules: Vec<Rule>,
    /// Rule id -> position in `rules`
    index: HashMap<String, usize>,
    categories: Vec<Category>,
}

impl RuleRegistry {
    /// Shared registry built from the embedded catalog on first access
    pub fn builtin() -> &'static RuleRegistry {
        &BUILTIN
    }

    /// Build a registry from rules, keeping their order.
    ///
    /// A repeated id replaces the earlier rule but keeps its position.
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut registry = Self::default();
        for rule in rules {
            registry.insert(rule);
        }
        registry
    }

    /// Attach category metadata
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Parse a YAML catalog with `categories` and `rules` lists
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(yaml)?;
        let registry = Self::from_rules(catalog.rules).with_categories(catalog.categories);
        debug!(
            rules = registry.len(),
            categories = registry.categories.len(),
            "Loaded rule catalog"
        );
        Ok(registry)
    }

    fn insert(&mut self, rule: Rule) {
        match self.index.get(&rule.id) {
            Some(&pos) => self.rules[pos] = rule,
            None => {
                self.index.insert(rule.id.clone(), self.rules.len());
                self.rules.push(rule);
            }
        }
    }

    /// Exact lookup by rule id
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.index.get(id).map(|&pos| &self.rules[pos])
    }

    /// All rules in registration order
    pub fn all(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn by_principle(&self, principle: Principle) -> Vec<&Rule> {
        self.rules.iter().filter(|r| r.principle == principle).collect()
    }

    pub fn by_level(&self, level: ConformanceLevel) -> Vec<&Rule> {
        self.rules.iter().filter(|r| r.level == level).collect()
    }

    pub fn by_impact(&self, impact: Impact) -> Vec<&Rule> {
        self.rules.iter().filter(|r| r.impact == impact).collect()
    }

    /// Case-insensitive substring search over title, description and tags.
    /// Matches come back in registration order, unranked.
    pub fn search(&self, query: &str) -> Vec<&Rule> {
        let query = query.to_lowercase();
        self.rules
            .iter()
            .filter(|rule| {
                rule.title.to_lowercase().contains(&query)
                    || rule.description.to_lowercase().contains(&query)
                    || rule.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// Category by id (`perceivable`, `operable`, ...)
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal rule for registry and aggregation tests
    pub(crate) fn rule(id: &str, principle: Principle, level: ConformanceLevel, impact: Impact) -> Rule {
        Rule {
            id: id.to_string(),
            title: format!("{} title", id),
            level,
            principle,
            guideline: "0.0.0 Test".to_string(),
            description: format!("{} description", id),
            explanation: format!("{} explanation", id),
            impact,
            tags: vec![format!("{}-tag", id)],
            remediation_steps: vec!["Fix it".to_string()],
            code_examples: Vec::new(),
            testing_methods: Vec::new(),
            resources: Vec::new(),
            common_mistakes: Vec::new(),
            user_impact: String::new(),
        }
    }

    #[test]
    fn test_builtin_catalog_parses() {
        let registry = RuleRegistry::builtin();
        assert!(registry.len() >= 6);
        assert_eq!(registry.categories().len(), 4);

        for id in ["color-contrast", "image-alt", "label", "keyboard", "heading-order", "focus-visible"] {
            assert!(registry.get(id).is_some(), "missing built-in rule {}", id);
        }

        let contrast = registry.get("color-contrast").unwrap();
        assert_eq!(contrast.impact, Impact::Serious);
        assert_eq!(contrast.level, ConformanceLevel::AA);
        assert_eq!(contrast.principle, Principle::Perceivable);
        assert!(!contrast.code_examples.is_empty());
    }

    #[test]
    fn test_builtin_rules_have_remediation_content() {
        for rule in RuleRegistry::builtin().all() {
            assert!(!rule.remediation_steps.is_empty(), "{} has no remediation steps", rule.id);
            assert!(!rule.user_impact.is_empty(), "{} has no user impact", rule.id);
            assert!(!rule.explanation.is_empty(), "{} has no explanation", rule.id);
        }
    }

    #[test]
    fn test_unknown_rule_is_absent() {
        assert!(RuleRegistry::builtin().get("nonexistent-rule").is_none());
    }

    #[test]
    fn test_all_preserves_registration_order() {
        let registry = RuleRegistry::from_rules(vec![
            rule("b", Principle::Operable, ConformanceLevel::A, Impact::Minor),
            rule("a", Principle::Robust, ConformanceLevel::AA, Impact::Serious),
            rule("c", Principle::Operable, ConformanceLevel::AA, Impact::Critical),
        ]);
        let ids: Vec<&str> = registry.all().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);

        let operable: Vec<&str> = registry
            .by_principle(Principle::Operable)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(operable, ["b", "c"]);

        let aa: Vec<&str> = registry.by_level(ConformanceLevel::AA).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(aa, ["a", "c"]);

        assert_eq!(registry.by_impact(Impact::Critical).len(), 1);
        assert!(registry.by_impact(Impact::Moderate).is_empty());
    }

    #[test]
    fn test_duplicate_id_replaces_in_place() {
        let mut replacement = rule("a", Principle::Robust, ConformanceLevel::AAA, Impact::Minor);
        replacement.title = "replaced".to_string();

        let registry = RuleRegistry::from_rules(vec![
            rule("a", Principle::Operable, ConformanceLevel::A, Impact::Critical),
            rule("b", Principle::Operable, ConformanceLevel::A, Impact::Critical),
            replacement,
        ]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.all()[0].title, "replaced");
        assert_eq!(registry.get("a").unwrap().impact, Impact::Minor);
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_description_and_tags() {
        let registry = RuleRegistry::builtin();

        let by_title: Vec<&str> = registry.search("CONTRAST").iter().map(|r| r.id.as_str()).collect();
        assert!(by_title.contains(&"color-contrast"));

        let by_tag: Vec<&str> = registry.search("alt-text").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(by_tag, ["image-alt"]);

        let keyboard = registry.search("keyboard");
        let positions: Vec<usize> = keyboard
            .iter()
            .map(|r| registry.all().iter().position(|x| x.id == r.id).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted, "search results must keep registration order");

        assert!(registry.search("zzz-no-such-thing").is_empty());
    }

    #[test]
    fn test_category_lookup() {
        let registry = RuleRegistry::builtin();
        let operable = registry.category("operable").unwrap();
        assert_eq!(operable.name, "Operable");
        assert!(registry.category("general").is_none());
    }

    #[test]
    fn test_from_yaml_rejects_invalid_catalog() {
        assert!(RuleRegistry::from_yaml("rules: [ { id: x } ]").is_err());
    }
}
