//! Cppcheck suppressions list parser.
//!
//! Each non-comment line names one suppressed check, optionally scoped to a
//! file (`misra-c2012-21.3:lib/src/alloc.c`). Only the MISRA directive is
//! kept; the scope is irrelevant to the compliance verdict.

use regex::Regex;

use crate::models::compliance::SuppressionSet;
use crate::parsers::{LineParser, ParseResult};

const DIRECTIVE_PATTERN: &str = r"misra-c2012-(\d+\.\d+)";

/// Suppressions list parser instance.
#[derive(Debug, Default)]
pub struct SuppressionsParser;

impl SuppressionsParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse and collapse into a set of directives.
    pub fn parse_set(&self, text: &str) -> Result<SuppressionSet, anyhow::Error> {
        Ok(self.parse(text)?.records.into_iter().collect())
    }
}

impl LineParser for SuppressionsParser {
    type Record = String;

    fn parse(&self, text: &str) -> Result<ParseResult<String>, anyhow::Error> {
        let directive_regex = Regex::new(DIRECTIVE_PATTERN)?;

        let mut result = ParseResult::default();
        for line in text.lines() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            match directive_regex.captures(line) {
                Some(caps) => result.records.push(caps[1].to_string()),
                None => result.skipped += 1,
            }
        }

        tracing::debug!(
            suppressions = result.records.len(),
            skipped = result.skipped,
            "Parsed suppressions list"
        );
        Ok(result)
    }

    fn source_name(&self) -> &str {
        "Cppcheck suppressions"
    }
}
