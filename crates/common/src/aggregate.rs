//! Metrics aggregation across scanned pages

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::rules::RuleRegistry;
use crate::types::{
    AggregateReport, ConformanceLevel, Finding, Impact, PageScanResult, Principle,
    PrincipleBreakdown, Summary,
};

/// Tag markers that assign a violation to a principle. A violation may match
/// several principles, or none.
const PRINCIPLE_TAG_MARKERS: [(Principle, &[&str]); 4] = [
    (Principle::Perceivable, &["cat.color", "cat.images", "cat.multimedia"]),
    (Principle::Operable, &["cat.keyboard", "cat.time-and-media"]),
    (Principle::Understandable, &["cat.language", "cat.predictable"]),
    (Principle::Robust, &["cat.parsing", "cat.compatibility"]),
];

/// Severity for a finding: its own impact, else the rule's, else Minor.
pub fn resolve_impact(finding: &Finding, rules: &RuleRegistry) -> Impact {
    finding
        .impact
        .or_else(|| rules.get(&finding.id).map(|rule| rule.impact))
        .unwrap_or(Impact::Minor)
}

/// Principles whose tag markers appear in `tags`, in canonical order
pub fn classify_principles<S: AsRef<str>>(tags: &[S]) -> Vec<Principle> {
    PRINCIPLE_TAG_MARKERS
        .iter()
        .filter(|(_, markers)| {
            tags.iter()
                .any(|tag| markers.iter().any(|marker| tag.as_ref().contains(marker)))
        })
        .map(|(principle, _)| *principle)
        .collect()
}

/// Percentage of passing pages, rounded half up; 0 when there are no pages
pub fn compliance_score(passed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((200 * passed + total) / (2 * total)).min(100) as u8
}

/// Computes [`AggregateReport`]s from page results
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    rules: &'a RuleRegistry,
    wcag_level: ConformanceLevel,
}

impl<'a> Aggregator<'a> {
    pub fn new(rules: &'a RuleRegistry) -> Self {
        Self {
            rules,
            wcag_level: ConformanceLevel::default(),
        }
    }

    /// WCAG level recorded in the summary
    pub fn with_wcag_level(mut self, level: ConformanceLevel) -> Self {
        self.wcag_level = level;
        self
    }

    /// Aggregate, stamping the report with the current time
    pub fn aggregate(&self, pages: &[PageScanResult]) -> AggregateReport {
        self.aggregate_at(pages, Utc::now())
    }

    /// Aggregate with an explicit timestamp. Identical inputs give identical
    /// reports.
    pub fn aggregate_at(&self, pages: &[PageScanResult], timestamp: DateTime<Utc>) -> AggregateReport {
        let mut counts = [0usize; 4];
        let mut breakdown = PrincipleBreakdown::default();

        for violation in pages.iter().flat_map(|page| page.violations.iter()) {
            let impact = resolve_impact(violation, self.rules);
            counts[impact as usize] += 1;

            for principle in classify_principles(&violation.tags) {
                breakdown.increment(principle);
            }
        }

        let passed_tests = pages.iter().filter(|p| p.is_passing()).count();
        let failed_tests = pages.len() - passed_tests;
        let total_tests = passed_tests + failed_tests;

        let [critical, serious, moderate, minor] = counts;
        let report = AggregateReport {
            timestamp,
            total_violations: critical + serious + moderate + minor,
            critical_violations: critical,
            serious_violations: serious,
            moderate_violations: moderate,
            minor_violations: minor,
            pages_analyzed: pages.len(),
            test_results: pages.to_vec(),
            summary: Summary {
                total_tests,
                passed_tests,
                failed_tests,
                compliance_score: compliance_score(passed_tests, total_tests),
                wcag_level: self.wcag_level,
                principle_breakdown: breakdown,
            },
        };

        debug!(
            pages = report.pages_analyzed,
            violations = report.total_violations,
            score = report.summary.compliance_score,
            "Aggregated accessibility metrics"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tests::rule;
    use crate::types::AffectedElement;
    use test_case::test_case;

    fn finding(id: &str, impact: Option<Impact>, tags: &[&str]) -> Finding {
        Finding {
            id: id.to_string(),
            impact,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: format!("{} description", id),
            help: String::new(),
            help_url: String::new(),
            nodes: vec![AffectedElement {
                html: "<div></div>".to_string(),
                impact,
                target: vec!["div".to_string()],
                failure_summary: None,
            }],
        }
    }

    fn page(name: &str, violations: Vec<Finding>) -> PageScanResult {
        PageScanResult {
            url: format!("https://example.test/{}", name),
            test_name: name.to_string(),
            timestamp: DateTime::parse_from_rfc3339("2026-01-05T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            violations,
            passes: Vec::new(),
            incomplete: Vec::new(),
            inapplicable: Vec::new(),
            error: None,
        }
    }

    fn registry() -> RuleRegistry {
        RuleRegistry::from_rules(vec![
            rule("image-alt", Principle::Perceivable, ConformanceLevel::A, Impact::Critical),
            rule("heading-order", Principle::Perceivable, ConformanceLevel::AA, Impact::Moderate),
        ])
    }

    #[test_case(0, 0, 0)]
    #[test_case(1, 1, 100)]
    #[test_case(1, 2, 50)]
    #[test_case(1, 3, 33)]
    #[test_case(2, 3, 67)]
    #[test_case(1, 8, 13)]
    #[test_case(0, 5, 0)]
    fn test_compliance_score(passed: usize, total: usize, expected: u8) {
        assert_eq!(compliance_score(passed, total), expected);
    }

    #[test]
    fn test_severity_resolution_order() {
        let rules = registry();
        // Finding impact wins over the rule
        assert_eq!(resolve_impact(&finding("image-alt", Some(Impact::Minor), &[]), &rules), Impact::Minor);
        // Rule impact fills in a missing one
        assert_eq!(resolve_impact(&finding("heading-order", None, &[]), &rules), Impact::Moderate);
        // Unknown rule with no impact defaults to Minor
        assert_eq!(resolve_impact(&finding("nonexistent-rule", None, &[]), &rules), Impact::Minor);
    }

    #[test]
    fn test_classification_is_non_exclusive() {
        assert_eq!(
            classify_principles(&["cat.color", "cat.keyboard", "wcag2aa"]),
            vec![Principle::Perceivable, Principle::Operable]
        );
        assert_eq!(classify_principles(&["cat.images", "cat.multimedia"]), vec![Principle::Perceivable]);
        assert_eq!(classify_principles(&["cat.aria", "best-practice"]), Vec::<Principle>::new());
        assert_eq!(
            classify_principles(&["cat.language", "cat.parsing"]),
            vec![Principle::Understandable, Principle::Robust]
        );
    }

    #[test]
    fn test_empty_input_yields_zeroed_report() {
        let rules = registry();
        let report = Aggregator::new(&rules).aggregate(&[]);
        assert_eq!(report.total_violations, 0);
        assert_eq!(report.pages_analyzed, 0);
        assert_eq!(report.summary.total_tests, 0);
        assert_eq!(report.summary.compliance_score, 0);
        assert_eq!(report.summary.principle_breakdown, PrincipleBreakdown::default());
    }

    #[test]
    fn test_single_clean_page_scores_100() {
        let rules = registry();
        let report = Aggregator::new(&rules).aggregate(&[page("home", vec![])]);
        assert_eq!(report.summary.compliance_score, 100);
        assert_eq!(report.summary.passed_tests, 1);
        assert_eq!(report.summary.failed_tests, 0);
    }

    #[test]
    fn test_critical_and_minor_on_one_of_two_pages() {
        let rules = registry();
        let pages = vec![
            page(
                "checkout",
                vec![
                    finding("image-alt", Some(Impact::Critical), &[]),
                    finding("region", Some(Impact::Minor), &[]),
                ],
            ),
            page("home", vec![]),
        ];
        let report = Aggregator::new(&rules).aggregate(&pages);

        assert_eq!(report.total_violations, 2);
        assert_eq!(report.critical_violations, 1);
        assert_eq!(report.minor_violations, 1);
        assert_eq!(report.serious_violations, 0);
        assert_eq!(report.moderate_violations, 0);
        assert_eq!(report.summary.passed_tests, 1);
        assert_eq!(report.summary.failed_tests, 1);
        assert_eq!(report.summary.compliance_score, 50);
    }

    #[test]
    fn test_counts_and_breakdown() {
        let rules = registry();
        let pages = vec![
            page(
                "login",
                vec![
                    finding("image-alt", None, &["cat.text-alternatives", "cat.images"]),
                    finding("color-contrast", Some(Impact::Serious), &["cat.color", "cat.keyboard"]),
                    finding("nonexistent-rule", None, &[]),
                ],
            ),
            page("inventory", vec![finding("heading-order", None, &["cat.semantics"])]),
            page("about", vec![]),
        ];

        let report = Aggregator::new(&rules)
            .with_wcag_level(ConformanceLevel::AAA)
            .aggregate(&pages);

        assert_eq!(report.total_violations, 4);
        assert_eq!(report.critical_violations, 1);
        assert_eq!(report.serious_violations, 1);
        assert_eq!(report.moderate_violations, 1);
        assert_eq!(report.minor_violations, 1);
        assert_eq!(report.pages_analyzed, 3);
        assert_eq!(report.summary.passed_tests, 1);
        assert_eq!(report.summary.failed_tests, 2);
        assert_eq!(report.summary.compliance_score, 33);
        assert_eq!(report.summary.wcag_level, ConformanceLevel::AAA);

        let breakdown = report.summary.principle_breakdown;
        assert_eq!(breakdown.perceivable, 2);
        assert_eq!(breakdown.operable, 1);
        assert_eq!(breakdown.understandable, 0);
        assert_eq!(breakdown.robust, 0);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let rules = registry();
        let pages = vec![
            page("a", vec![finding("image-alt", None, &["cat.images"])]),
            page("b", vec![]),
        ];
        let at = Utc::now();
        let aggregator = Aggregator::new(&rules);

        let first = aggregator.aggregate_at(&pages, at);
        let second = aggregator.aggregate_at(&pages, at);
        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }
}
