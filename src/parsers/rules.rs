//! Guideline catalog parser for the MISRA rules text document.
//!
//! The document is free text until the `Appendix A Summary of guidelines`
//! marker. After it, non-blank lines come in pairs: a `Rule <directive>
//! <category>` header followed by one rationale line.
//!
//! Pairing is positional. An extra non-blank line inside a pair, or a
//! rationale that itself looks like a header, shifts every later pair by
//! one line. A header that fails the pattern still produces a rule, with an
//! empty directive and category, and is counted as skipped.

use regex::Regex;

use crate::models::rule::{Category, Rule};
use crate::parsers::{LineParser, ParseResult};

/// Line that opens the parseable part of the document.
pub const APPENDIX_MARKER: &str = "Appendix A Summary of guidelines";

const HEADER_PATTERN: &str = r"^Rule (\d+\.\d+) (\w+)";

/// Scanner position in the document.
#[derive(Debug, Clone, PartialEq)]
enum ScanState {
    BeforeAppendix,
    AwaitingHeader,
    AwaitingRationale { header: String },
}

/// Rules document parser instance.
#[derive(Debug, Default)]
pub struct RulesParser;

impl RulesParser {
    pub fn new() -> Self {
        Self
    }
}

impl LineParser for RulesParser {
    type Record = Rule;

    fn parse(&self, text: &str) -> Result<ParseResult<Rule>, anyhow::Error> {
        let header_regex = Regex::new(HEADER_PATTERN)?;

        let mut result = ParseResult::default();
        let mut state = ScanState::BeforeAppendix;

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }

            state = match state {
                ScanState::BeforeAppendix => {
                    if line.trim().starts_with(APPENDIX_MARKER) {
                        ScanState::AwaitingHeader
                    } else {
                        ScanState::BeforeAppendix
                    }
                }
                ScanState::AwaitingHeader => ScanState::AwaitingRationale {
                    header: line.to_string(),
                },
                ScanState::AwaitingRationale { header } => {
                    let rule = match header_regex.captures(&header) {
                        Some(caps) => Rule::new(&caps[1], Category::from_label(&caps[2]), line),
                        None => {
                            tracing::warn!(header = %header, "Rules header does not match expected pattern");
                            result.skipped += 1;
                            Rule::new("", Category::Other(String::new()), line)
                        }
                    };
                    result.records.push(rule);
                    ScanState::AwaitingHeader
                }
            };
        }

        if let ScanState::AwaitingRationale { header } = state {
            tracing::warn!(header = %header, "Rules document ends inside a header/rationale pair");
            result.skipped += 1;
        }

        tracing::debug!(
            rules = result.records.len(),
            skipped = result.skipped,
            "Parsed rules document"
        );
        Ok(result)
    }

    fn source_name(&self) -> &str {
        "MISRA rules text"
    }
}
