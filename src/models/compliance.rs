//! Reconciled compliance model shared by both report assemblers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::rule::Category;

/// Tri-state compliance classification of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "COMPLIANT")]
    Compliant,
    #[serde(rename = "NON-COMPLIANT")]
    NonCompliant,
    #[serde(rename = "DEVIATION")]
    Deviation,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliant => "COMPLIANT",
            Self::NonCompliant => "NON-COMPLIANT",
            Self::Deviation => "DEVIATION",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-level result shown in the report headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallResult {
    Compliant,
    #[serde(rename = "Non-Compliant")]
    NonCompliant,
}

impl std::fmt::Display for OverallResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compliant => write!(f, "Compliant"),
            Self::NonCompliant => write!(f, "Non-Compliant"),
        }
    }
}

/// Set of explicitly waived directives.
pub type SuppressionSet = BTreeSet<String>;

/// Reconciliation result for one catalog rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceEntry {
    pub directive: String,
    pub category: Category,
    /// Reserved column of the compliance table; never populated.
    pub recategorization: Option<String>,
    pub verdict: Verdict,
}

/// Violation and deviation counts per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    pub violations: BTreeMap<Category, usize>,
    pub deviations: BTreeMap<Category, usize>,
}

impl Default for CategoryTally {
    fn default() -> Self {
        let seeded: BTreeMap<Category, usize> =
            Category::KNOWN.into_iter().map(|c| (c, 0)).collect();
        Self {
            violations: seeded.clone(),
            deviations: seeded,
        }
    }
}

impl CategoryTally {
    pub fn violations_in(&self, category: &Category) -> usize {
        self.violations.get(category).copied().unwrap_or(0)
    }

    pub fn deviations_in(&self, category: &Category) -> usize {
        self.deviations.get(category).copied().unwrap_or(0)
    }

    pub fn total_violations(&self) -> usize {
        self.violations.values().sum()
    }
}

/// Output of the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub entries: Vec<ComplianceEntry>,
    pub tally: CategoryTally,
    /// Violations whose directive is absent from the rule catalog.
    pub orphans: usize,
}

impl Reconciliation {
    pub fn overall(&self) -> OverallResult {
        if self
            .entries
            .iter()
            .any(|e| e.verdict == Verdict::NonCompliant)
        {
            OverallResult::NonCompliant
        } else {
            OverallResult::Compliant
        }
    }
}
