//! Analyzer violation record.

use serde::{Deserialize, Serialize};

/// One reported deviation from a guideline at one source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub file: String,
    pub line: u32,
    /// Severity label as printed by the analyzer (`style`, `error`, ...).
    pub category: String,
    pub rationale: String,
    /// Guideline identifier, `<major>.<minor>`.
    pub directive: String,
}

impl Violation {
    pub fn new(
        file: impl Into<String>,
        line: u32,
        category: impl Into<String>,
        rationale: impl Into<String>,
        directive: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            category: category.into(),
            rationale: rationale.into(),
            directive: directive.into(),
        }
    }
}
