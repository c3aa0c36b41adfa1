//! Report pipeline orchestrating parsing, reconciliation, rendering and
//! artifact output.
//!
//! Steps run strictly in sequence: rules, suppressions, analyzer output,
//! file manifest, reconciliation, document layout, PDF rendering, artifact
//! upload, comment rendering. An unreadable input aborts the run before
//! anything is written.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::AppError;
use crate::models::compliance::{Reconciliation, SuppressionSet};
use crate::models::document::Document;
use crate::models::report::{parse_deviations, AnalyzedFile, DeviationRecord, ReportMetadata};
use crate::models::rule::Rule;
use crate::models::violation::Violation;
use crate::parsers::cppcheck::CppcheckParser;
use crate::parsers::manifest::ManifestParser;
use crate::parsers::rules::RulesParser;
use crate::parsers::suppressions::SuppressionsParser;
use crate::parsers::LineParser;
use crate::services::comment::{render_comment, CommentInput};
use crate::services::document::{build_document, DocumentInput};
use crate::services::pdf::render_pdf;
use crate::services::reconciliation::reconcile;
use crate::services::storage::ArtifactStore;

/// Input files of one report run.
#[derive(Debug, Clone)]
pub struct ReportInputs {
    pub results_file: PathBuf,
    pub rules_file: PathBuf,
    pub suppressions_file: PathBuf,
    pub files_manifest: Option<PathBuf>,
    pub deviations_file: Option<PathBuf>,
}

/// Files one report run writes.
#[derive(Debug, Clone)]
pub struct ReportOutputs {
    /// Printable report, the artifact that gets uploaded.
    pub pdf: PathBuf,
    /// Draw instructions behind the PDF, as pretty JSON.
    pub document: PathBuf,
    pub comment: PathBuf,
}

/// Lines each parser could not turn into a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkippedLines {
    pub results: usize,
    pub rules: usize,
    pub suppressions: usize,
    pub manifest: usize,
}

/// Parsed and reconciled inputs of one report run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub rules: Vec<Rule>,
    pub violations: Vec<Violation>,
    pub suppressions: SuppressionSet,
    pub files: Vec<AnalyzedFile>,
    pub deviations: Vec<DeviationRecord>,
    pub reconciliation: Reconciliation,
    pub skipped: SkippedLines,
}

/// Outputs of one report run.
#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    pub analysis: Analysis,
    pub document: Document,
    pub pdf: Vec<u8>,
    pub comment: String,
    pub download_url: Option<String>,
}

/// Read an input file, mapping any failure to `AppError::InputAccess`.
pub async fn read_input(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::InputAccess {
            path: path.to_path_buf(),
            source,
        })
}

fn run_parser<P: LineParser>(parser: &P, text: &str) -> Result<(Vec<P::Record>, usize), AppError> {
    let result = parser
        .parse(text)
        .map_err(|e| AppError::Internal(format!("{} parser failed: {e}", parser.source_name())))?;
    Ok((result.records, result.skipped))
}

/// Parse every input and reconcile violations against the catalog.
pub async fn analyze(inputs: &ReportInputs, workspace: &str) -> Result<Analysis, AppError> {
    let rules_text = read_input(&inputs.rules_file).await?;
    let (rules, rules_skipped) = run_parser(&RulesParser::new(), &rules_text)?;

    let suppressions_text = read_input(&inputs.suppressions_file).await?;
    let (suppression_lines, suppressions_skipped) =
        run_parser(&SuppressionsParser::new(), &suppressions_text)?;
    let suppressions: SuppressionSet = suppression_lines.into_iter().collect();

    let results_text = read_input(&inputs.results_file).await?;
    let (violations, results_skipped) = run_parser(&CppcheckParser::new(), &results_text)?;

    let (files, manifest_skipped) = match &inputs.files_manifest {
        Some(path) => {
            let text = read_input(path).await?;
            run_parser(&ManifestParser::new(workspace), &text)?
        }
        None => (Vec::new(), 0),
    };

    let deviations = match &inputs.deviations_file {
        Some(path) => parse_deviations(&read_input(path).await?)?,
        None => Vec::new(),
    };

    tracing::info!(
        rules = rules.len(),
        suppressions = suppressions.len(),
        violations = violations.len(),
        files = files.len(),
        "Parsed report inputs"
    );

    let reconciliation = reconcile(&rules, &violations, &suppressions);

    Ok(Analysis {
        rules,
        violations,
        suppressions,
        files,
        deviations,
        reconciliation,
        skipped: SkippedLines {
            results: results_skipped,
            rules: rules_skipped,
            suppressions: suppressions_skipped,
            manifest: manifest_skipped,
        },
    })
}

/// Lay out the printable report for an analysis.
pub fn report_document(analysis: &Analysis, metadata: &ReportMetadata) -> Document {
    build_document(&DocumentInput {
        reconciliation: &analysis.reconciliation,
        metadata,
        deviations: &analysis.deviations,
        files: &analysis.files,
    })
}

/// Render the pull-request comment for an analysis.
pub fn report_comment(analysis: &Analysis, metadata: &ReportMetadata) -> String {
    render_comment(&CommentInput {
        reconciliation: &analysis.reconciliation,
        rules: &analysis.rules,
        violations: &analysis.violations,
        suppressions: &analysis.suppressions,
        metadata,
    })
}

/// Artifact name for a commit's PDF report.
pub fn artifact_name(commit: &str) -> String {
    format!("misra-report-{commit}.pdf")
}

/// Run the full generation pipeline and write every artifact.
///
/// When a store is given, the PDF is uploaded before the comment is
/// rendered so the comment can link to it.
pub async fn generate_report<S: ArtifactStore>(
    inputs: &ReportInputs,
    metadata: &ReportMetadata,
    outputs: &ReportOutputs,
    store: Option<&S>,
) -> Result<ReportArtifacts, AppError> {
    let analysis = analyze(inputs, &metadata.workspace).await?;

    let document = report_document(&analysis, metadata);
    tokio::fs::write(&outputs.document, serde_json::to_vec_pretty(&document)?).await?;

    let pdf = render_pdf(
        &document,
        &format!("{} MISRA C Compliance Report", metadata.project),
    )?;
    tokio::fs::write(&outputs.pdf, &pdf).await?;
    tracing::info!(
        path = %outputs.pdf.display(),
        pages = document.page_count(),
        "Wrote compliance report"
    );

    let download_url = match store {
        Some(store) => Some(
            store
                .upload(&artifact_name(&metadata.commit), &pdf, "application/pdf")
                .await?,
        ),
        None => None,
    };

    let linked = ReportMetadata {
        download_url: download_url.clone(),
        ..metadata.clone()
    };
    let comment = report_comment(&analysis, &linked);
    tokio::fs::write(&outputs.comment, &comment).await?;
    tracing::info!(path = %outputs.comment.display(), "Wrote report comment");

    Ok(ReportArtifacts {
        analysis,
        document,
        pdf,
        comment,
        download_url,
    })
}
