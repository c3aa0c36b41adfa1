//! Markdown renderer for the pull-request report comment.
//!
//! The first line of every body is `REPORT_MARKER`. The publisher looks for
//! it to update the previous report comment instead of adding a new one.

use std::collections::HashMap;

use crate::models::compliance::{OverallResult, Reconciliation, SuppressionSet};
use crate::models::report::ReportMetadata;
use crate::models::rule::{Category, Rule};
use crate::models::violation::Violation;
use crate::services::permalink::source_permalink;

/// Hidden tag identifying a report comment.
pub const REPORT_MARKER: &str = "<!-- MISRA C REPORT -->";

/// Everything the comment is rendered from.
#[derive(Debug, Clone, Copy)]
pub struct CommentInput<'a> {
    pub reconciliation: &'a Reconciliation,
    pub rules: &'a [Rule],
    pub violations: &'a [Violation],
    pub suppressions: &'a SuppressionSet,
    pub metadata: &'a ReportMetadata,
}

/// Render the full comment body.
pub fn render_comment(input: &CommentInput<'_>) -> String {
    let catalog: HashMap<&str, &Rule> = input
        .rules
        .iter()
        .rev()
        .map(|r| (r.directive.as_str(), r))
        .collect();

    let mut out = String::new();
    out.push_str(REPORT_MARKER);
    out.push('\n');
    out.push_str("## MISRA C Compliance Report\n\n");
    render_metadata(&mut out, input.metadata, input.reconciliation.overall());

    if input.violations.is_empty() {
        out.push_str("\n> :white_check_mark: **No MISRA C violations found.**\n");
        render_suppressions(&mut out, input.suppressions, &catalog);
        return out;
    }

    render_summary(&mut out, input.reconciliation);
    render_violations(&mut out, input.violations, &catalog, input.metadata);
    render_suppressions(&mut out, input.suppressions, &catalog);
    out
}

fn render_metadata(out: &mut String, metadata: &ReportMetadata, overall: OverallResult) {
    let result = match overall {
        OverallResult::Compliant => format!(":white_check_mark: {overall}"),
        OverallResult::NonCompliant => format!(":x: {overall}"),
    };

    out.push_str("| | |\n|---|---|\n");
    out.push_str(&format!("| **Project** | {} |\n", escape_cell(&metadata.project)));
    out.push_str(&format!("| **Commit** | `{}` |\n", metadata.commit));
    out.push_str(&format!("| **Date** | {} |\n", escape_cell(&metadata.date)));
    out.push_str(&format!("| **Guidelines** | {} |\n", escape_cell(&metadata.guidelines)));
    out.push_str(&format!("| **Checking Tool** | {} |\n", escape_cell(&metadata.checking_tool)));
    out.push_str(&format!("| **Result** | {result} |\n"));
    if let Some(url) = &metadata.download_url {
        out.push_str(&format!("| **Report** | [Download compliance report]({url}) |\n"));
    }
}

fn render_summary(out: &mut String, reconciliation: &Reconciliation) {
    let tally = &reconciliation.tally;
    out.push_str("\n### Violations by Category\n\n");
    out.push_str("| Category | Violations | Deviations |\n|---|---:|---:|\n");
    for category in tally.violations.keys() {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(category.label()),
            tally.violations_in(category),
            tally.deviations_in(category)
        ));
    }
}

fn render_violations(
    out: &mut String,
    violations: &[Violation],
    catalog: &HashMap<&str, &Rule>,
    metadata: &ReportMetadata,
) {
    out.push_str(&format!(
        "\n<details>\n<summary>Violations ({})</summary>\n\n",
        violations.len()
    ));
    out.push_str("| Location | Directive | Category | Rationale |\n|---|---|---|---|\n");
    for violation in violations {
        let url = source_permalink(
            &metadata.server_url,
            &metadata.repository,
            &metadata.commit,
            &metadata.workspace,
            &violation.file,
            violation.line,
        );
        let category = catalog
            .get(violation.directive.as_str())
            .map(|r| r.category.label().to_string())
            .unwrap_or_else(|| violation.category.clone());
        out.push_str(&format!(
            "| [{}:{}]({}) | {} | {} | {} |\n",
            escape_cell(&violation.file),
            violation.line,
            url,
            violation.directive,
            escape_cell(&category),
            escape_cell(&violation.rationale)
        ));
    }
    out.push_str("\n</details>\n");
}

fn render_suppressions(
    out: &mut String,
    suppressions: &SuppressionSet,
    catalog: &HashMap<&str, &Rule>,
) {
    if suppressions.is_empty() {
        return;
    }

    let mut directives: Vec<&String> = suppressions.iter().collect();
    directives.sort_by_key(|d| directive_key(d));

    out.push_str("\n### Deviations\n\n");
    out.push_str("| Directive | Category | Rationale |\n|---|---|---|\n");
    for directive in directives {
        let (category, rationale) = match catalog.get(directive.as_str()) {
            Some(rule) => (rule.category.clone(), rule.rationale.as_str()),
            None => (Category::Other("Unknown".to_string()), ""),
        };
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            directive,
            escape_cell(category.label()),
            escape_cell(rationale)
        ));
    }
}

/// Numeric sort key for `<major>.<minor>` directives.
fn directive_key(directive: &str) -> (u32, u32) {
    let mut parts = directive.split('.').map(|p| p.parse::<u32>().unwrap_or(u32::MAX));
    (
        parts.next().unwrap_or(u32::MAX),
        parts.next().unwrap_or(u32::MAX),
    )
}

/// Escape text for a Markdown table cell. HTML-significant characters are
/// entity-encoded.
fn escape_cell(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('|', "\\|")
        .replace('_', "\\_")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}
