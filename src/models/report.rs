//! Report metadata and caller-supplied report inputs.

use serde::{Deserialize, Serialize};

/// Run metadata shown in both the comment and the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub project: String,
    pub commit: String,
    pub date: String,
    pub guidelines: String,
    pub checking_tool: String,
    /// Durable link to the uploaded document, when one was published.
    pub download_url: Option<String>,
    /// `<owner>/<repo>` slug used to build source permalinks.
    pub repository: String,
    pub server_url: String,
    pub workspace: String,
}

/// One source file listed in the files-analyzed section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedFile {
    pub module: String,
    /// Path relative to the workspace root.
    pub path: String,
}

/// Documented deviation shown in the example table of the deviations page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationRecord {
    pub rule: String,
    pub category: String,
    pub rationale: String,
    /// Row height in points; estimated from the rationale when absent.
    #[serde(default)]
    pub row_height: Option<f32>,
}

/// Load deviation records from their JSON configuration file contents.
///
/// A `row_height` that is not a positive finite number is discarded, so the
/// row height is estimated instead.
pub fn parse_deviations(data: &str) -> Result<Vec<DeviationRecord>, serde_json::Error> {
    let mut records: Vec<DeviationRecord> = serde_json::from_str(data)?;
    for record in &mut records {
        if let Some(height) = record.row_height {
            if !(height.is_finite() && height > 0.0) {
                tracing::warn!(
                    rule = %record.rule,
                    row_height = height,
                    "Ignoring non-positive deviation row height"
                );
                record.row_height = None;
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deviation_row_height_is_optional() {
        let records = parse_deviations(
            r#"[
                {"rule": "Directive 15.5", "category": "Advisory", "rationale": "Early returns."},
                {"rule": "Directive 21.3", "category": "Required", "rationale": "Heap.", "row_height": 225.0}
            ]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row_height, None);
        assert_eq!(records[1].row_height, Some(225.0));
    }

    #[test]
    fn non_positive_row_height_falls_back_to_estimate() {
        let records = parse_deviations(
            r#"[
                {"rule": "Directive 15.5", "category": "Advisory", "rationale": "a", "row_height": 0.0},
                {"rule": "Directive 21.3", "category": "Required", "rationale": "b", "row_height": -40.0},
                {"rule": "Directive 21.6", "category": "Required", "rationale": "c", "row_height": 12.5}
            ]"#,
        )
        .unwrap();
        assert_eq!(records[0].row_height, None);
        assert_eq!(records[1].row_height, None);
        assert_eq!(records[2].row_height, Some(12.5));
    }

    #[test]
    fn malformed_deviations_are_rejected() {
        assert!(parse_deviations("{\"rule\": 1}").is_err());
    }
}
