//! Cppcheck MISRA addon output parser.
//!
//! Reads the plain-text log Cppcheck prints with `--addon=misra`, one
//! finding per line:
//!
//! ```text
//! src/foo.c:10:3: style: some rationale [misra-c2012-8.4]
//! ```
//!
//! ANSI color sequences are stripped before matching. Banner, progress and
//! summary lines are skipped.

use regex::Regex;

use crate::models::violation::Violation;
use crate::parsers::{LineParser, ParseResult};

const ANSI_PATTERN: &str = r"\x1B\[[;?\d]*[A-HJKSTfimnrsu]";
const FINDING_PATTERN: &str = r"^(.+?):(\d+):\d+: (\w+): (.+) \[misra-c2012-(\d+\.\d+)\]$";

/// Cppcheck log parser instance.
#[derive(Debug, Default)]
pub struct CppcheckParser;

impl CppcheckParser {
    pub fn new() -> Self {
        Self
    }
}

impl LineParser for CppcheckParser {
    type Record = Violation;

    fn parse(&self, text: &str) -> Result<ParseResult<Violation>, anyhow::Error> {
        let ansi = Regex::new(ANSI_PATTERN)?;
        let finding = Regex::new(FINDING_PATTERN)?;

        let mut result = ParseResult::default();
        for line in text.lines() {
            let cleaned = ansi.replace_all(line, "");
            if cleaned.trim().is_empty() {
                continue;
            }
            match convert_line(&cleaned, &finding) {
                Some(violation) => result.records.push(violation),
                None => result.skipped += 1,
            }
        }

        tracing::debug!(
            violations = result.records.len(),
            skipped = result.skipped,
            "Parsed analyzer output"
        );
        Ok(result)
    }

    fn source_name(&self) -> &str {
        "Cppcheck"
    }
}

fn convert_line(line: &str, finding: &Regex) -> Option<Violation> {
    let caps = finding.captures(line)?;

    // Line numbers are 1-based; zero or overflow means the line is not a finding.
    let line_number = caps[2].parse::<u32>().ok().filter(|n| *n > 0)?;

    Some(Violation::new(
        &caps[1],
        line_number,
        &caps[3],
        &caps[4],
        &caps[5],
    ))
}
