//! File manifest parser for the files-analyzed section.
//!
//! Lines have the form `<module>::<path>`, where the path is usually
//! absolute inside the CI workspace. Paths are reported relative to the
//! workspace root.

use crate::models::report::AnalyzedFile;
use crate::parsers::{LineParser, ParseResult};

const SEPARATOR: &str = "::";

/// Manifest parser bound to a workspace root.
#[derive(Debug, Default)]
pub struct ManifestParser {
    workspace: String,
}

impl ManifestParser {
    pub fn new(workspace: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }
}

impl LineParser for ManifestParser {
    type Record = AnalyzedFile;

    fn parse(&self, text: &str) -> Result<ParseResult<AnalyzedFile>, anyhow::Error> {
        let mut result = ParseResult::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((module, path)) = line.split_once(SEPARATOR) else {
                result.skipped += 1;
                continue;
            };
            let path = relative_to(path.trim(), &self.workspace);
            if path.is_empty() {
                result.skipped += 1;
                continue;
            }
            result.records.push(AnalyzedFile {
                module: module.trim().to_string(),
                path,
            });
        }

        tracing::debug!(
            files = result.records.len(),
            skipped = result.skipped,
            "Parsed file manifest"
        );
        Ok(result)
    }

    fn source_name(&self) -> &str {
        "file manifest"
    }
}

/// Strip the workspace root and any leading separators from a path.
pub fn relative_to(path: &str, workspace: &str) -> String {
    let root = workspace.trim_end_matches('/');
    let stripped = if root.is_empty() {
        path
    } else {
        match path.strip_prefix(root) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        }
    };
    stripped
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_string()
}
