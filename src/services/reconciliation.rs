//! Reconciliation of analyzer violations against the guideline catalog and
//! the suppression list.
//!
//! The catalog drives iteration: every rule gets exactly one verdict, and a
//! violation whose directive is not in the catalog cannot be categorized,
//! so it is counted as an orphan and otherwise dropped.

use std::collections::{HashMap, HashSet};

use crate::models::compliance::{
    CategoryTally, ComplianceEntry, Reconciliation, SuppressionSet, Verdict,
};
use crate::models::rule::{Category, Rule};
use crate::models::violation::Violation;

/// Classify one directive. Suppression wins over a violation.
pub fn verdict_for(suppressed: bool, violated: bool) -> Verdict {
    if suppressed {
        Verdict::Deviation
    } else if violated {
        Verdict::NonCompliant
    } else {
        Verdict::Compliant
    }
}

/// Join rules, violations and suppressions into per-rule verdicts and
/// per-category tallies.
pub fn reconcile(
    rules: &[Rule],
    violations: &[Violation],
    suppressions: &SuppressionSet,
) -> Reconciliation {
    let violated: HashSet<&str> = violations.iter().map(|v| v.directive.as_str()).collect();

    // First occurrence defines a directive's category.
    let mut catalog: HashMap<&str, &Category> = HashMap::new();
    for rule in rules {
        catalog.entry(rule.directive.as_str()).or_insert(&rule.category);
    }

    let entries: Vec<ComplianceEntry> = rules
        .iter()
        .map(|rule| ComplianceEntry {
            directive: rule.directive.clone(),
            category: rule.category.clone(),
            recategorization: None,
            verdict: verdict_for(
                suppressions.contains(&rule.directive),
                violated.contains(rule.directive.as_str()),
            ),
        })
        .collect();

    let mut tally = CategoryTally::default();
    let mut orphans = 0usize;
    for violation in violations {
        match catalog.get(violation.directive.as_str()) {
            Some(category) => {
                *tally.violations.entry((*category).clone()).or_insert(0) += 1;
            }
            None => {
                tracing::warn!(
                    directive = %violation.directive,
                    file = %violation.file,
                    line = violation.line,
                    "Violation directive not found in rule catalog"
                );
                orphans += 1;
            }
        }
    }

    for entry in entries.iter().filter(|e| e.verdict == Verdict::Deviation) {
        *tally.deviations.entry(entry.category.clone()).or_insert(0) += 1;
    }

    tracing::info!(
        rules = entries.len(),
        violations = violations.len(),
        orphans,
        "Reconciled violations against rule catalog"
    );

    Reconciliation {
        entries,
        tally,
        orphans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(directive: &str, category: Category) -> Rule {
        Rule::new(directive, category, "rationale")
    }

    fn violation(directive: &str) -> Violation {
        Violation::new("src/a.c", 1, "style", "message", directive)
    }

    fn suppressed(directives: &[&str]) -> SuppressionSet {
        directives.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn verdict_precedence() {
        assert_eq!(verdict_for(true, true), Verdict::Deviation);
        assert_eq!(verdict_for(true, false), Verdict::Deviation);
        assert_eq!(verdict_for(false, true), Verdict::NonCompliant);
        assert_eq!(verdict_for(false, false), Verdict::Compliant);
    }

    #[test]
    fn one_entry_per_rule() {
        let rules = vec![rule("1.1", Category::Required), rule("2.1", Category::Required)];
        let result = reconcile(&rules, &[violation("1.1")], &suppressed(&["2.1"]));

        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].directive, "1.1");
        assert_eq!(result.entries[0].verdict, Verdict::NonCompliant);
        assert_eq!(result.entries[1].directive, "2.1");
        assert_eq!(result.entries[1].verdict, Verdict::Deviation);
        assert!(result.entries.iter().all(|e| e.recategorization.is_none()));
    }

    #[test]
    fn suppressed_and_violated_is_a_deviation() {
        let rules = vec![rule("21.3", Category::Required)];
        let result = reconcile(&rules, &[violation("21.3")], &suppressed(&["21.3"]));
        assert_eq!(result.entries[0].verdict, Verdict::Deviation);
    }

    #[test]
    fn tally_counts_every_catalogued_violation() {
        let rules = vec![rule("11.5", Category::Advisory), rule("8.4", Category::Required)];
        let violations = vec![violation("11.5"), violation("11.5"), violation("8.4")];
        let result = reconcile(&rules, &violations, &SuppressionSet::new());

        assert_eq!(result.tally.violations_in(&Category::Advisory), 2);
        assert_eq!(result.tally.violations_in(&Category::Required), 1);
        assert_eq!(result.tally.violations.get(&Category::Mandatory), Some(&0));
    }

    #[test]
    fn orphans_are_excluded_from_entries_and_tally() {
        let rules = vec![rule("1.1", Category::Required)];
        let result = reconcile(&rules, &[violation("99.1")], &SuppressionSet::new());

        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].verdict, Verdict::Compliant);
        assert_eq!(result.tally.total_violations(), 0);
        assert_eq!(result.orphans, 1);
    }

    #[test]
    fn deviations_are_tallied_by_category() {
        let rules = vec![
            rule("15.5", Category::Advisory),
            rule("21.3", Category::Required),
            rule("21.6", Category::Required),
        ];
        let result = reconcile(&rules, &[], &suppressed(&["15.5", "21.3", "21.6", "4.2"]));

        assert_eq!(result.tally.deviations_in(&Category::Advisory), 1);
        assert_eq!(result.tally.deviations_in(&Category::Required), 2);
        assert_eq!(result.tally.deviations_in(&Category::Mandatory), 0);
    }

    #[test]
    fn empty_inputs_yield_seeded_tally() {
        let result = reconcile(&[], &[], &SuppressionSet::new());
        assert!(result.entries.is_empty());
        assert_eq!(result.orphans, 0);
        for category in Category::KNOWN {
            assert_eq!(result.tally.violations.get(&category), Some(&0));
        }
    }

    #[test]
    fn non_tier_categories_extend_the_tally() {
        let rules = vec![rule("5.1", Category::Other("Style".to_string()))];
        let result = reconcile(&rules, &[violation("5.1")], &SuppressionSet::new());
        assert_eq!(
            result.tally.violations_in(&Category::Other("Style".to_string())),
            1
        );
        assert_eq!(result.tally.violations.len(), 4);
    }
}
