//! HTML report rendering
//!
//! Produces a single self-contained document (inline CSS, inline JS, embedded
//! JSON export) from an [`AggregateReport`] and the page results behind it.
//! Rendering is pure: the only clock the output depends on is
//! `report.timestamp`.

use std::borrow::Cow;

use accesslens_common::{
    compliance_score, resolve_impact, AggregateReport, Category, ConformanceLevel, Finding, Impact,
    PageScanResult, Principle, Rule, RuleRegistry,
};
use html_escape::{encode_double_quoted_attribute, encode_safe};
use tracing::{debug, warn};

use crate::config::ReportConfig;

const STYLESHEET: &str = include_str!("../assets/report.css");
const SCRIPT: &str = include_str!("../assets/report.js");

/// Principle label for findings without a rule entry
const GENERAL_LABEL: &str = "General";
const GENERAL_CATEGORY: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderMode {
    Interactive,
    /// No scripts, no controls, every section open
    Printable,
}

impl RenderMode {
    fn is_interactive(self) -> bool {
        self == RenderMode::Interactive
    }
}

/// Everything a violation card needs, resolved once
struct Card<'a> {
    finding: &'a Finding,
    page: &'a PageScanResult,
    rule: Option<&'a Rule>,
    /// Catalog metadata for the rule's principle
    category: Option<&'a Category>,
    impact: Impact,
}

impl<'a> Card<'a> {
    fn principle(&self) -> Option<Principle> {
        self.rule.map(|r| r.principle)
    }

    fn category_id(&self) -> &'static str {
        self.principle().map(|p| p.as_str()).unwrap_or(GENERAL_CATEGORY)
    }

    fn principle_badge(&self) -> String {
        match self.category {
            Some(category) => format!(
                "<span class=\"violation-badge badge-principle\" style=\"--principle-color: {}\">{} {}</span>",
                attr(&category.color),
                esc(&category.icon),
                esc(&category.name)
            ),
            None => format!(
                "<span class=\"violation-badge badge-principle\">{}</span>",
                self.principle().map(|p| p.label()).unwrap_or(GENERAL_LABEL)
            ),
        }
    }

    fn level_label(&self) -> &'static str {
        self.rule
            .map(|r| r.level)
            .or_else(|| ConformanceLevel::from_tags(&self.finding.tags))
            .map(|l| l.as_str())
            .unwrap_or("N/A")
    }

    fn title(&self) -> &str {
        match self.rule {
            Some(rule) => &rule.title,
            None if !self.finding.help.is_empty() => &self.finding.help,
            None => &self.finding.id,
        }
    }

    fn explanation(&self) -> &str {
        match self.rule {
            Some(rule) if !rule.explanation.is_empty() => &rule.explanation,
            _ if !self.finding.description.is_empty() => &self.finding.description,
            _ => "No detailed explanation available.",
        }
    }
}

/// Renders accessibility reports against a rule registry
#[derive(Debug, Clone)]
pub struct ReportRenderer<'a> {
    rules: &'a RuleRegistry,
    config: ReportConfig,
}

impl<'a> ReportRenderer<'a> {
    pub fn new(rules: &'a RuleRegistry, config: ReportConfig) -> Self {
        Self { rules, config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Interactive document with theme toggle, filters and JSON export
    pub fn render(&self, report: &AggregateReport, pages: &[PageScanResult]) -> String {
        self.render_document(report, pages, RenderMode::Interactive)
    }

    /// Static document for printing or archiving
    pub fn render_printable(&self, report: &AggregateReport, pages: &[PageScanResult]) -> String {
        self.render_document(report, pages, RenderMode::Printable)
    }

    fn render_document(
        &self,
        report: &AggregateReport,
        pages: &[PageScanResult],
        mode: RenderMode,
    ) -> String {
        let mut html = String::with_capacity(64 * 1024);
        let theme = self.config.theme.as_str();

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
        html.push_str(&format!("<title>{}</title>\n", esc(&self.config.title)));
        html.push_str(&format!("<style>\n{}</style>\n</head>\n", STYLESHEET));
        html.push_str(&format!(
            "<body class=\"theme-{0}\" data-theme=\"{0}\">\n<div class=\"report-container\">\n",
            theme
        ));

        self.write_header(&mut html, report);
        if self.config.include_summary {
            self.write_summary(&mut html, report);
        }
        if mode.is_interactive() {
            write_quick_actions(&mut html);
            write_filters(&mut html, self.rules);
        }
        if self.config.include_violations {
            self.write_violations(&mut html, pages, mode);
        }
        self.write_page_results(&mut html, pages);
        write_footer(&mut html);
        html.push_str("</div>\n");

        if mode.is_interactive() {
            write_report_data(&mut html, report);
            html.push_str(&format!("<script>\n{}</script>\n", SCRIPT));
        }
        html.push_str("</body>\n</html>\n");

        debug!(
            mode = ?mode,
            pages = pages.len(),
            bytes = html.len(),
            "Rendered accessibility report"
        );
        html
    }

    fn write_header(&self, html: &mut String, report: &AggregateReport) {
        let score = report.summary.compliance_score;
        html.push_str(&format!(
            r#"<header class="report-header">
<div class="header-content">
<div>
<h1 class="report-title">{title}</h1>
<p class="report-subtitle">WCAG {level} Accessibility Assessment</p>
</div>
<div class="report-meta">
<div class="meta-item"><span class="meta-label">Generated</span><span class="meta-value">{generated}</span></div>
<div class="meta-item"><span class="meta-label">Pages Tested</span><span class="meta-value">{pages}</span></div>
<div class="meta-item"><span class="meta-label">Compliance Score</span><span class="meta-value {score_class}">{score}%</span></div>
</div>
</div>
</header>
"#,
            title = esc(&self.config.title),
            level = report.summary.wcag_level,
            generated = report.timestamp.format("%B %-d, %Y %H:%M UTC"),
            pages = report.pages_analyzed,
            score_class = score_class(score),
            score = score,
        ));
    }

    fn write_summary(&self, html: &mut String, report: &AggregateReport) {
        let score = report.summary.compliance_score;
        let total = report.total_violations;

        html.push_str("<section class=\"summary-section\">\n");
        html.push_str("<h2 class=\"section-title\"><span class=\"section-icon\">📊</span> Executive Summary</h2>\n");
        html.push_str("<div class=\"summary-grid\">\n");

        write_summary_card(
            html,
            "compliance-score",
            "Compliance Score",
            "🎯",
            &format!("{}%", score),
            &format!(
                "Share of tested pages with no violations against WCAG {}",
                report.summary.wcag_level
            ),
            Some(score),
        );

        for impact in Impact::ALL {
            let count = report.count_for(impact);
            let (icon, description) = severity_copy(impact);
            write_summary_card(
                html,
                &format!("severity-{}", impact.as_str()),
                &format!("{} Issues", impact.label()),
                icon,
                &count.to_string(),
                description,
                Some(compliance_score(count, total)),
            );
        }

        write_summary_card(
            html,
            "total-violations",
            "Total Violations",
            "📋",
            &total.to_string(),
            "All accessibility violations found across tested pages",
            None,
        );

        html.push_str("</div>\n</section>\n");
    }

    fn write_violations(&self, html: &mut String, pages: &[PageScanResult], mode: RenderMode) {
        let cards: Vec<Card<'_>> = pages
            .iter()
            .flat_map(|page| page.violations.iter().map(move |finding| (page, finding)))
            .map(|(page, finding)| {
                let rule = self.rules.get(&finding.id);
                Card {
                    finding,
                    page,
                    rule,
                    category: rule.and_then(|r| self.rules.category(r.principle.as_str())),
                    impact: resolve_impact(finding, self.rules),
                }
            })
            .collect();

        html.push_str("<section class=\"violations-section\">\n");

        if cards.is_empty() {
            html.push_str(
                r#"<h2 class="section-title"><span class="section-icon">✅</span> Accessibility Violations</h2>
<div class="summary-card compliance-score no-violations">
<div class="card-header"><h3 class="card-title">No Violations Found</h3><span class="card-icon">🎉</span></div>
<p class="card-description">No accessibility violations were found. The scanned pages meet the tested WCAG guidelines.</p>
</div>
</section>
"#,
            );
            return;
        }

        html.push_str(&format!(
            "<h2 class=\"section-title\"><span class=\"section-icon\">🔍</span> Accessibility Violations ({})</h2>\n",
            cards.len()
        ));
        html.push_str("<div class=\"violations-grid\" id=\"violations-container\">\n");

        if self.config.group_by_category {
            let groups = Principle::ALL.iter().map(|p| Some(*p)).chain(std::iter::once(None));
            for group in groups {
                let members: Vec<&Card<'_>> =
                    cards.iter().filter(|c| c.principle() == group).collect();
                if members.is_empty() {
                    continue;
                }
                let count = members.len();
                self.write_group_heading(html, group, count);
                for card in members {
                    self.write_card(html, card, mode);
                }
                html.push_str("</div>\n");
            }
        } else {
            for card in &cards {
                self.write_card(html, card, mode);
            }
        }

        html.push_str("</div>\n</section>\n");
    }

    /// Opens a `violation-group` wrapper; the caller closes it
    fn write_group_heading(&self, html: &mut String, group: Option<Principle>, count: usize) {
        let id = group.map(|p| p.as_str()).unwrap_or(GENERAL_CATEGORY);
        match group.and_then(|p| self.rules.category(p.as_str())) {
            Some(category) => html.push_str(&format!(
                r#"<div class="violation-group" data-category="{id}" style="--group-color: {color}">
<h3 class="group-title"><span class="group-icon">{icon}</span> {name} ({count})</h3>
<p class="group-description">{description}</p>
"#,
                id = id,
                color = attr(&category.color),
                icon = esc(&category.icon),
                name = esc(&category.name),
                count = count,
                description = esc(&category.description),
            )),
            None => html.push_str(&format!(
                "<div class=\"violation-group\" data-category=\"{}\">\n<h3 class=\"group-title\">{} ({})</h3>\n",
                id,
                group.map(|p| p.label()).unwrap_or(GENERAL_LABEL),
                count
            )),
        }
    }

    fn write_card(&self, html: &mut String, card: &Card<'_>, mode: RenderMode) {
        let finding = card.finding;

        html.push_str(&format!(
            r#"<article class="violation-card" data-severity="{severity}" data-category="{category}" data-rule="{rule}">
<div class="violation-header">
<div>
<h3 class="violation-title">{title}</h3>
<div class="violation-meta">
<span class="violation-badge badge-{severity}">{severity_label}</span>
{principle}
<span class="violation-badge badge-level">{level}</span>
</div>
<p class="violation-description">{explanation}</p>
</div>
<div class="violation-stats">
<span>{count} element(s) affected</span>
<span>Page: {page}</span>
</div>
</div>
<div class="violation-content">
"#,
            severity = card.impact.as_str(),
            category = card.category_id(),
            rule = attr(&finding.id),
            title = esc(card.title()),
            severity_label = card.impact.label(),
            principle = card.principle_badge(),
            level = card.level_label(),
            explanation = esc(card.explanation()),
            count = finding.nodes.len(),
            page = esc(&card.page.test_name),
        ));

        if let Some(rule) = card.rule {
            if self.config.include_remediation {
                self.write_remediation(html, rule, mode);
            }
        }
        write_affected_elements(html, finding, mode);
        if self.config.include_technical_details {
            write_technical_details(html, finding);
        }

        html.push_str("</div>\n</article>\n");
    }

    fn write_remediation(&self, html: &mut String, rule: &Rule, mode: RenderMode) {
        let mut details = String::new();
        details.push_str(&format!(
            "<div class=\"detail-block\"><h4>User Impact</h4><p>{}</p></div>\n",
            esc(&rule.user_impact)
        ));
        details.push_str(&format!(
            "<div class=\"detail-block\"><h4>WCAG Reference</h4><p>{}</p></div>\n",
            esc(&rule.guideline)
        ));
        if !rule.common_mistakes.is_empty() {
            details.push_str("<div class=\"detail-block\"><h4>Common Mistakes</h4>");
            details.push_str(&list("ul", &rule.common_mistakes));
            details.push_str("</div>\n");
        }
        write_expandable(html, mode, "📋 Detailed Information", false, &details);

        if !rule.remediation_steps.is_empty() {
            write_expandable(html, mode, "🔧 How to Fix", false, &list("ol", &rule.remediation_steps));
        }

        if self.config.include_code_examples && !rule.code_examples.is_empty() {
            let mut examples = String::from("<div class=\"code-examples\">\n");
            for example in &rule.code_examples {
                examples.push_str(&format!(
                    r#"<div class="code-example code-bad"><div class="code-example-header">❌ Incorrect Implementation</div><pre><code>{}</code></pre></div>
<div class="code-example code-good"><div class="code-example-header">✅ Correct Implementation</div><pre><code>{}</code></pre></div>
<p class="code-example-note">{}</p>
"#,
                    esc(&example.bad),
                    esc(&example.good),
                    esc(&example.description),
                ));
            }
            examples.push_str("</div>\n");
            write_expandable(html, mode, "💻 Code Examples", false, &examples);
        }

        if !rule.testing_methods.is_empty() {
            write_expandable(html, mode, "🧪 Testing Methods", false, &list("ul", &rule.testing_methods));
        }
        if !rule.resources.is_empty() {
            write_expandable(html, mode, "📚 Additional Resources", false, &list("ul", &rule.resources));
        }
    }

    fn write_page_results(&self, html: &mut String, pages: &[PageScanResult]) {
        html.push_str("<section class=\"results-section\">\n");
        html.push_str("<h2 class=\"section-title\"><span class=\"section-icon\">📝</span> Test Results Summary</h2>\n");
        html.push_str("<div class=\"violations-grid\">\n");

        let shown: Vec<&PageScanResult> = pages
            .iter()
            .filter(|p| !self.config.show_only_failures || !p.is_passing())
            .collect();

        if shown.is_empty() && !pages.is_empty() {
            html.push_str("<p class=\"card-description\">All tested pages passed.</p>\n");
        }

        for page in shown {
            let passed = page.is_passing();
            let status = if passed { "passed" } else { "failed" };
            html.push_str(&format!(
                r#"<article class="violation-card page-result" data-status="{status}">
<div class="violation-header">
<div>
<h3 class="violation-title">{name}</h3>
<div class="violation-meta">
<span class="violation-badge badge-{status}">{status_label}</span>
<span class="violation-badge badge-level">{count} issues</span>
</div>
<p class="violation-description">URL: {url}</p>
"#,
                status = status,
                name = esc(&page.test_name),
                status_label = if passed { "PASSED" } else { "FAILED" },
                count = page.violations.len(),
                url = esc(&page.url),
            ));
            if let Some(error) = &page.error {
                html.push_str(&format!("<p class=\"scan-error\">Scan error: {}</p>\n", esc(error)));
            }
            html.push_str(&format!(
                "</div>\n<div class=\"page-status {}\">{}</div>\n</div>\n",
                status,
                if passed { "✅" } else { "❌" }
            ));

            if !passed {
                html.push_str("<div class=\"violation-content\">\n");
                for finding in &page.violations {
                    html.push_str(&format!(
                        "<div class=\"page-violation\"><strong>{}</strong>: {}</div>\n",
                        esc(&finding.id),
                        esc(&finding.description)
                    ));
                }
                html.push_str("</div>\n");
            }
            html.push_str("</article>\n");
        }

        html.push_str("</div>\n</section>\n");
    }
}

/// Escape text content
fn esc(text: &str) -> Cow<'_, str> {
    encode_safe(text)
}

/// Escape a double-quoted attribute value
fn attr(text: &str) -> Cow<'_, str> {
    encode_double_quoted_attribute(text)
}

fn score_class(score: u8) -> &'static str {
    if score >= 90 {
        "score-success"
    } else if score >= 70 {
        "score-warning"
    } else {
        "score-error"
    }
}

fn severity_copy(impact: Impact) -> (&'static str, &'static str) {
    match impact {
        Impact::Critical => ("🚨", "Issues that completely block access for users with disabilities"),
        Impact::Serious => ("⚠️", "Issues that significantly impact user experience"),
        Impact::Moderate => ("⚡", "Issues that may cause difficulties for some users"),
        Impact::Minor => ("💡", "Issues with minimal impact on accessibility"),
    }
}

fn write_summary_card(
    html: &mut String,
    class: &str,
    title: &str,
    icon: &str,
    value: &str,
    description: &str,
    progress: Option<u8>,
) {
    html.push_str(&format!(
        r#"<div class="summary-card {class}">
<div class="card-header"><h3 class="card-title">{title}</h3><span class="card-icon">{icon}</span></div>
<div class="card-value">{value}</div>
<p class="card-description">{description}</p>
"#,
        class = class,
        title = title,
        icon = icon,
        value = value,
        description = description,
    ));
    if let Some(percent) = progress {
        html.push_str(&format!(
            "<div class=\"card-progress\"><div class=\"progress-fill\" style=\"width: {}%\"></div></div>\n",
            percent
        ));
    }
    html.push_str("</div>\n");
}

fn write_quick_actions(html: &mut String) {
    html.push_str(
        r#"<section class="quick-actions">
<button type="button" class="action-button primary" onclick="exportReport()">📊 Export Data</button>
<button type="button" class="action-button" onclick="toggleTheme()">🌙 Toggle Theme</button>
<button type="button" class="action-button" onclick="printReport()">🖨️ Print Report</button>
<button type="button" class="action-button" onclick="showHelp()">❓ Help Guide</button>
</section>
"#,
    );
}

fn write_filters(html: &mut String, rules: &RuleRegistry) {
    html.push_str(
        r#"<section class="filters-section">
<div class="filters-grid">
<div class="filter-group">
<label class="filter-label" for="severity-filter">Filter by Severity</label>
<select id="severity-filter" class="filter-control" onchange="filterBySeverity(this.value)">
<option value="">All Severities</option>
"#,
    );
    for impact in Impact::ALL {
        html.push_str(&format!(
            "<option value=\"{}\">{}</option>\n",
            impact.as_str(),
            impact.label()
        ));
    }
    html.push_str(
        r#"</select>
</div>
<div class="filter-group">
<label class="filter-label" for="category-filter">Filter by Category</label>
<select id="category-filter" class="filter-control" onchange="filterByCategory(this.value)">
<option value="">All Categories</option>
"#,
    );
    for principle in Principle::ALL {
        let name = rules
            .category(principle.as_str())
            .map(|c| c.name.as_str())
            .unwrap_or(principle.label());
        html.push_str(&format!(
            "<option value=\"{}\">{}</option>\n",
            principle.as_str(),
            esc(name)
        ));
    }
    html.push_str(&format!(
        "<option value=\"{}\">{}</option>\n",
        GENERAL_CATEGORY, GENERAL_LABEL
    ));
    html.push_str(
        r#"</select>
</div>
<div class="filter-group">
<label class="filter-label" for="search-filter">Search Violations</label>
<input type="search" id="search-filter" class="filter-control" placeholder="Search..." oninput="searchViolations(this.value)">
</div>
</div>
</section>
"#,
    );
}

fn write_expandable(html: &mut String, mode: RenderMode, title: &str, expanded: bool, body: &str) {
    let open = expanded || !mode.is_interactive();
    let class = if open { "expandable-section expanded" } else { "expandable-section" };

    html.push_str(&format!("<div class=\"{}\">\n", class));
    if mode.is_interactive() {
        html.push_str(&format!(
            "<div class=\"section-header\" role=\"button\" tabindex=\"0\" aria-expanded=\"{}\" onclick=\"toggleSection(this)\">",
            open
        ));
        html.push_str(&format!(
            "<span class=\"section-header-title\">{}</span><span class=\"expand-icon\" aria-hidden=\"true\">▼</span></div>\n",
            title
        ));
    } else {
        html.push_str(&format!(
            "<div class=\"section-header\"><span class=\"section-header-title\">{}</span></div>\n",
            title
        ));
    }
    html.push_str("<div class=\"section-content\">\n");
    html.push_str(body);
    html.push_str("</div>\n</div>\n");
}

fn write_affected_elements(html: &mut String, finding: &Finding, mode: RenderMode) {
    if finding.nodes.is_empty() {
        return;
    }

    let mut body = String::new();
    for (index, node) in finding.nodes.iter().enumerate() {
        body.push_str(&format!(
            r#"<div class="affected-element">
<div class="element-heading"><strong>Element {}</strong><span>{}</span></div>
<div class="element-html"><code>{}</code></div>
"#,
            index + 1,
            node.impact.map(|i| i.label()).unwrap_or("Unknown impact"),
            esc(&node.html),
        ));
        if !node.target.is_empty() {
            let selectors: Vec<Cow<'_, str>> = node.target.iter().map(|t| esc(t)).collect();
            body.push_str(&format!(
                "<div><strong>Selector:</strong> <code>{}</code></div>\n",
                selectors.join("</code>, <code>")
            ));
        }
        if let Some(summary) = &node.failure_summary {
            body.push_str(&format!("<div><strong>Details:</strong> {}</div>\n", esc(summary)));
        }
        body.push_str("</div>\n");
    }

    write_expandable(
        html,
        mode,
        &format!("🎯 Affected Elements ({})", finding.nodes.len()),
        true,
        &body,
    );
}

fn write_technical_details(html: &mut String, finding: &Finding) {
    html.push_str(&format!(
        "<div class=\"technical-details\"><div><strong>Rule:</strong> <code>{}</code></div>\n",
        esc(&finding.id)
    ));
    if !finding.help_url.is_empty() {
        let url = &finding.help_url;
        if url.starts_with("https://") || url.starts_with("http://") {
            html.push_str(&format!(
                "<div><strong>Reference:</strong> <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></div>\n",
                attr(url),
                esc(url)
            ));
        } else {
            html.push_str(&format!("<div><strong>Reference:</strong> {}</div>\n", esc(url)));
        }
    }
    if !finding.tags.is_empty() {
        let tags: Vec<Cow<'_, str>> = finding.tags.iter().map(|t| esc(t)).collect();
        html.push_str(&format!(
            "<div><strong>Tags:</strong> <code>{}</code></div>\n",
            tags.join("</code> <code>")
        ));
    }
    html.push_str("</div>\n");
}

fn write_footer(html: &mut String) {
    html.push_str(&format!(
        r#"<footer class="report-footer">
<p>Generated by AccessLens {} · WCAG 2.1/2.2 compliance assessment</p>
<p>Automated scans cover a subset of WCAG success criteria. Manual review is still required.</p>
</footer>
"#,
        accesslens_common::VERSION
    ));
}

/// Embed the report for the Export Data action. `<`, `>` and `&` only occur
/// inside JSON strings, so unicode escapes keep the payload valid JSON while
/// making it inert to the HTML parser.
fn write_report_data(html: &mut String, report: &AggregateReport) {
    match serde_json::to_string(report) {
        Ok(json) => {
            let json = json
                .replace('<', "\\u003c")
                .replace('>', "\\u003e")
                .replace('&', "\\u0026");
            html.push_str(&format!(
                "<script type=\"application/json\" id=\"report-data\">{}</script>\n",
                json
            ));
        }
        Err(e) => warn!(error = %e, "Failed to embed report data; export will be unavailable"),
    }
}

fn list(tag: &str, items: &[String]) -> String {
    let mut out = format!("<{}>", tag);
    for item in items {
        out.push_str(&format!("<li>{}</li>", esc(item)));
    }
    out.push_str(&format!("</{}>\n", tag));
    out
}
