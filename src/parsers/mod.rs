//! Line-oriented extractors turning raw input text into typed records.
//!
//! Each parser implements the `LineParser` trait. Lines that do not match
//! a parser's expected shape are never errors: they are skipped and
//! counted in `ParseResult::skipped`.

pub mod cppcheck;
pub mod manifest;
pub mod rules;
pub mod suppressions;

/// Records extracted from one input text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult<T> {
    pub records: Vec<T>,
    /// Non-blank lines that produced no record or a degraded one.
    pub skipped: usize,
}

impl<T> Default for ParseResult<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
        }
    }
}

/// Trait for pluggable line-oriented input parsers.
pub trait LineParser {
    type Record;

    /// Parse raw text into records, preserving input order.
    ///
    /// Content never causes an error; only internal failures (such as a
    /// pattern that fails to compile) do.
    fn parse(&self, text: &str) -> Result<ParseResult<Self::Record>, anyhow::Error>;

    /// Human-readable name of the input this parser handles.
    fn source_name(&self) -> &str;
}
