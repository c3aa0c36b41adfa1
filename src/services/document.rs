//! Printable compliance report layout.
//!
//! Builds the page-description model section by section: title page with
//! summary, compliance table, deviations page and files-analyzed list.
//! Every paginated section lays out its rows with its own `PageCursor` and
//! starts on a fresh page, so no section can disturb another's layout.

use crate::models::compliance::{CategoryTally, ComplianceEntry, OverallResult, Reconciliation, Verdict};
use crate::models::document::{Align, Cell, Document, DrawOp, Font};
use crate::models::pagination::{PageCapacity, PageCursor};
use crate::models::report::{AnalyzedFile, DeviationRecord, ReportMetadata};
use crate::models::rule::Category;

pub const LOGO_IMAGE: &str = "misra_c.png";

const LEFT_MARGIN: f32 = 75.0;
const TITLE_FONT_SIZE: f32 = 19.0;
const CONTENT_FONT_SIZE: f32 = 10.0;
const LOGO_WIDTH: f32 = 85.0;
const LINE_MARGIN: f32 = 15.0;
const SUMMARY_CELL_MARGIN: f32 = 100.0;
const LINE_WIDTH: f32 = 0.35;
const CELL_PADDING_X: f32 = 5.0;
const CELL_PADDING_Y: f32 = 6.0;

const SUMMARY_TOP: f32 = 230.0;

const RESULTS_HEADER_TOP: f32 = 430.0;
const RESULTS_ROW_HEIGHT: f32 = 25.0;
const RESULTS_COLUMNS: [f32; 4] = [114.0, 114.0, 114.0, 114.0];
const RESULTS_CAPACITY: PageCapacity = PageCapacity {
    first_page_rows: 10,
    other_page_rows: 25,
    first_page_top: RESULTS_HEADER_TOP + LINE_MARGIN,
    continuation_top: 100.0,
};

const DEVIATIONS_HEADER_TOP: f32 = 220.0;
const DEVIATIONS_COLUMNS: [f32; 3] = [132.0, 102.0, 222.0];
const DEVIATIONS_CAPACITY: PageCapacity = PageCapacity {
    first_page_rows: 1,
    other_page_rows: 3,
    first_page_top: DEVIATIONS_HEADER_TOP + LINE_MARGIN,
    continuation_top: 100.0,
};

const FILES_CAPACITY: PageCapacity = PageCapacity {
    first_page_rows: 35,
    other_page_rows: 40,
    first_page_top: 125.0,
    continuation_top: 100.0,
};

// Monospace glyph advance and line pitch at CONTENT_FONT_SIZE.
const GLYPH_WIDTH: f32 = 6.0;
const TEXT_LINE_HEIGHT: f32 = 12.0;

const WHITE: &str = "#ffffff";
const LIGHT_GREY: &str = "#efefef";
const WARNING_TINT: &str = "#ea9999";
const CAUTION_TINT: &str = "#fff2cc";
const BLACK: &str = "black";

const DEVIATION_POLICY: &str = "MISRA allows deviations from guidelines in situations where those \
guidelines might be impractical or unreasonable to follow. All such deviations must be documented \
and authorized. The documentation should include the guideline, situation, rationale for \
deviation, and risk analysis.";

/// Everything the document is built from.
#[derive(Debug, Clone, Copy)]
pub struct DocumentInput<'a> {
    pub reconciliation: &'a Reconciliation,
    pub metadata: &'a ReportMetadata,
    pub deviations: &'a [DeviationRecord],
    pub files: &'a [AnalyzedFile],
}

/// Lay out the complete report.
pub fn build_document(input: &DocumentInput<'_>) -> Document {
    let mut doc = Document::default();

    let title_page = doc.add_page();
    draw_title(&mut doc, title_page);
    let y = draw_summary(
        &mut doc,
        title_page,
        input.metadata,
        input.reconciliation.overall(),
    );
    draw_summary_text(&mut doc, title_page, y, &input.reconciliation.tally);
    draw_compliance_table(&mut doc, title_page, &input.reconciliation.entries);

    let deviations_page = doc.add_page();
    draw_deviations(&mut doc, deviations_page, input.deviations);

    let files_page = doc.add_page();
    draw_files_analyzed(&mut doc, files_page, input.files);

    tracing::debug!(pages = doc.page_count(), "Laid out compliance document");
    doc
}

fn text(content: impl Into<String>, x: f32, y: f32, font: Font, size: f32) -> DrawOp {
    DrawOp::Text {
        text: content.into(),
        x,
        y,
        font,
        size,
        color: BLACK.to_string(),
        width: None,
        align: Align::Left,
    }
}

fn cell_text(content: &str, x: f32, y: f32, width: f32, align: Align) -> DrawOp {
    DrawOp::Text {
        text: content.to_string(),
        x,
        y,
        font: Font::Regular,
        size: CONTENT_FONT_SIZE,
        color: BLACK.to_string(),
        width: Some(width),
        align,
    }
}

fn stroke(x: f32, y: f32, width: f32, height: f32) -> DrawOp {
    DrawOp::StrokeRect {
        x,
        y,
        width,
        height,
        line_width: LINE_WIDTH,
        color: BLACK.to_string(),
    }
}

fn fill(x: f32, y: f32, width: f32, height: f32, color: &str) -> DrawOp {
    DrawOp::FillRect {
        x,
        y,
        width,
        height,
        color: color.to_string(),
    }
}

fn draw_title(doc: &mut Document, page: usize) {
    doc.push(
        page,
        DrawOp::Image {
            name: LOGO_IMAGE.to_string(),
            x: LEFT_MARGIN,
            y: 75.0,
            width: LOGO_WIDTH,
        },
    );
    doc.push(
        page,
        text(
            "MISRA Guideline Compliance Summary",
            LEFT_MARGIN,
            175.0,
            Font::Regular,
            TITLE_FONT_SIZE,
        ),
    );
}

/// Key-value summary block. Returns the offset below the block.
fn draw_summary(
    doc: &mut Document,
    page: usize,
    metadata: &ReportMetadata,
    overall: OverallResult,
) -> f32 {
    let rows = [
        ("Project:", metadata.project.clone(), None),
        ("Commit:", metadata.commit.clone(), None),
        ("Date:", metadata.date.clone(), None),
        ("Guidelines:", metadata.guidelines.clone(), None),
        ("Checking Tool:", metadata.checking_tool.clone(), None),
        ("Result:", overall.to_string(), Some(overall)),
    ];

    let mut y = SUMMARY_TOP;
    for (key, value, result) in rows {
        doc.push(page, text(key, LEFT_MARGIN, y, Font::Regular, CONTENT_FONT_SIZE));
        let color = match result {
            Some(OverallResult::Compliant) => "green",
            Some(OverallResult::NonCompliant) => "red",
            None => BLACK,
        };
        doc.push(
            page,
            DrawOp::Text {
                text: value,
                x: LEFT_MARGIN + SUMMARY_CELL_MARGIN,
                y,
                font: Font::Bold,
                size: CONTENT_FONT_SIZE,
                color: color.to_string(),
                width: None,
                align: Align::Left,
            },
        );
        y += LINE_MARGIN;
    }
    y
}

fn count_description(count: usize, category: &str, tag: &str) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} {tag}{plural} of {category} guidelines")
}

/// Narrative sentence interpolating the violation and deviation tallies.
pub fn summary_sentence(tally: &CategoryTally) -> String {
    let describe = |tag: &str, count_of: &dyn Fn(&Category) -> usize| {
        [Category::Mandatory, Category::Required, Category::Advisory]
            .iter()
            .map(|c| count_description(count_of(c), &c.label().to_lowercase(), tag))
            .collect::<Vec<_>>()
    };
    let violations = describe("violation", &|c| tally.violations_in(c));
    let deviations = describe("deviation", &|c| tally.deviations_in(c));

    format!(
        "There were {}, {}, and {}. There were also {}, {}, and {}.",
        violations[0], violations[1], violations[2], deviations[0], deviations[1], deviations[2]
    )
}

fn draw_summary_text(doc: &mut Document, page: usize, top: f32, tally: &CategoryTally) {
    let mut y = top + 20.0;
    doc.push(page, text("Summary:", LEFT_MARGIN, y, Font::Regular, CONTENT_FONT_SIZE));
    y += LINE_MARGIN;
    doc.push(
        page,
        text(summary_sentence(tally), LEFT_MARGIN, y, Font::Regular, CONTENT_FONT_SIZE),
    );
}

fn draw_table_headers(doc: &mut Document, page: usize, y: f32, headers: &[Cell]) {
    let mut x = LEFT_MARGIN;
    for header in headers {
        doc.push(page, stroke(x, y, header.width, LINE_MARGIN));
        doc.push(page, cell_text(&header.text, x, y, header.width, Align::Center));
        x += header.width;
    }
}

/// Draw one bordered row of cells; the row background must already be filled.
fn draw_row_cells(doc: &mut Document, page: usize, y: f32, height: f32, cells: &[Cell]) {
    let total: f32 = cells.iter().map(|c| c.width).sum();
    doc.push(page, stroke(LEFT_MARGIN, y, total, height));

    let mut x = LEFT_MARGIN;
    for cell in cells {
        doc.push(
            page,
            cell_text(
                &cell.text,
                x + CELL_PADDING_X,
                y + CELL_PADDING_Y,
                cell.width - 4.0,
                Align::Left,
            ),
        );
        doc.push(page, stroke(x, y, cell.width, height));
        x += cell.width;
    }
}

/// Background fills for a compliance row: parity tint, then the verdict
/// override when there is one.
pub fn row_tints(row_index: usize, verdict: Verdict) -> Vec<&'static str> {
    let mut tints = vec![if row_index % 2 == 0 { WHITE } else { LIGHT_GREY }];
    match verdict {
        Verdict::NonCompliant => tints.push(WARNING_TINT),
        Verdict::Deviation => tints.push(CAUTION_TINT),
        Verdict::Compliant => {}
    }
    tints
}

fn compliance_cells(entry: &ComplianceEntry) -> Vec<Cell> {
    vec![
        Cell::new(format!("Rule {}", entry.directive), RESULTS_COLUMNS[0]),
        Cell::new(entry.category.label(), RESULTS_COLUMNS[1]),
        Cell::new(
            entry.recategorization.clone().unwrap_or_default(),
            RESULTS_COLUMNS[2],
        ),
        Cell::new(entry.verdict.as_str(), RESULTS_COLUMNS[3]),
    ]
}

fn draw_compliance_table(doc: &mut Document, start_page: usize, entries: &[ComplianceEntry]) {
    let headers: Vec<Cell> = ["Guideline", "Category", "Recategorization", "Compliance"]
        .iter()
        .zip(RESULTS_COLUMNS)
        .map(|(h, w)| Cell::new(*h, w))
        .collect();
    draw_table_headers(doc, start_page, RESULTS_HEADER_TOP, &headers);

    let table_width: f32 = RESULTS_COLUMNS.iter().sum();
    let mut cursor = PageCursor::new(RESULTS_CAPACITY);
    for (index, entry) in entries.iter().enumerate() {
        let placement = cursor.place(RESULTS_ROW_HEIGHT);
        let page = start_page + placement.page_index;
        for tint in row_tints(index, entry.verdict) {
            doc.push(
                page,
                fill(LEFT_MARGIN, placement.y, table_width, RESULTS_ROW_HEIGHT, tint),
            );
        }
        draw_row_cells(doc, page, placement.y, RESULTS_ROW_HEIGHT, &compliance_cells(entry));
    }
}

/// Row height for a deviation record, estimated from its longest cell when
/// the record does not specify one.
pub fn deviation_row_height(record: &DeviationRecord) -> f32 {
    if let Some(height) = record.row_height.filter(|h| h.is_finite() && *h > 0.0) {
        return height;
    }
    let lines = [&record.rule, &record.category, &record.rationale]
        .iter()
        .zip(DEVIATIONS_COLUMNS)
        .map(|(content, width)| {
            let per_line = ((width - 4.0) / GLYPH_WIDTH).floor().max(1.0) as usize;
            content.chars().count().div_ceil(per_line).max(1)
        })
        .max()
        .unwrap_or(1);
    lines as f32 * TEXT_LINE_HEIGHT + 2.0 * CELL_PADDING_Y
}

fn draw_deviations(doc: &mut Document, start_page: usize, deviations: &[DeviationRecord]) {
    doc.push(
        start_page,
        text("Deviations", LEFT_MARGIN, 100.0, Font::Regular, TITLE_FONT_SIZE),
    );
    let table_width: f32 = DEVIATIONS_COLUMNS.iter().sum();
    doc.push(
        start_page,
        DrawOp::Text {
            text: DEVIATION_POLICY.to_string(),
            x: LEFT_MARGIN,
            y: 150.0,
            font: Font::Regular,
            size: CONTENT_FONT_SIZE,
            color: BLACK.to_string(),
            width: Some(table_width),
            align: Align::Left,
        },
    );

    let headers: Vec<Cell> = ["Rule", "Category", "Rationale for Skipping"]
        .iter()
        .zip(DEVIATIONS_COLUMNS)
        .map(|(h, w)| Cell::new(*h, w))
        .collect();
    draw_table_headers(doc, start_page, DEVIATIONS_HEADER_TOP, &headers);

    let mut cursor = PageCursor::new(DEVIATIONS_CAPACITY);
    for (index, record) in deviations.iter().enumerate() {
        let height = deviation_row_height(record);
        let placement = cursor.place(height);
        let page = start_page + placement.page_index;
        let tint = if index % 2 == 0 { WHITE } else { LIGHT_GREY };
        doc.push(page, fill(LEFT_MARGIN, placement.y, table_width, height, tint));

        let cells = vec![
            Cell::new(record.rule.as_str(), DEVIATIONS_COLUMNS[0]),
            Cell::new(record.category.as_str(), DEVIATIONS_COLUMNS[1]),
            Cell::new(record.rationale.as_str(), DEVIATIONS_COLUMNS[2]),
        ];
        draw_row_cells(doc, page, placement.y, height, &cells);
    }
}

fn draw_files_analyzed(doc: &mut Document, start_page: usize, files: &[AnalyzedFile]) {
    doc.push(
        start_page,
        text("Files Analyzed", LEFT_MARGIN, 75.0, Font::Regular, TITLE_FONT_SIZE),
    );

    let mut cursor = PageCursor::new(FILES_CAPACITY);
    for file in files {
        let placement = cursor.place(LINE_MARGIN);
        doc.push(
            start_page + placement.page_index,
            text(
                file.path.as_str(),
                LEFT_MARGIN + CELL_PADDING_X,
                placement.y + CELL_PADDING_Y,
                Font::Regular,
                CONTENT_FONT_SIZE,
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::compliance::SuppressionSet;
    use crate::models::rule::Rule;
    use crate::models::violation::Violation;
    use crate::services::reconciliation::reconcile;

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            project: "cardano-c".to_string(),
            commit: "3f2a9c1".to_string(),
            date: "2026-10-16".to_string(),
            guidelines: "MISRA C:2012".to_string(),
            checking_tool: "Cppcheck".to_string(),
            download_url: None,
            repository: "Biglup/cardano-c".to_string(),
            server_url: "https://github.com".to_string(),
            workspace: String::new(),
        }
    }

    fn catalog(count: usize) -> Vec<Rule> {
        (1..=count)
            .map(|i| Rule::new(format!("{i}.1"), Category::Required, "rationale"))
            .collect()
    }

    fn files(count: usize) -> Vec<AnalyzedFile> {
        (0..count)
            .map(|i| AnalyzedFile {
                module: "lib".to_string(),
                path: format!("lib/src/file_{i}.c"),
            })
            .collect()
    }

    fn build(rules: &[Rule], deviations: &[DeviationRecord], files: &[AnalyzedFile]) -> Document {
        let reconciliation = reconcile(rules, &[], &SuppressionSet::new());
        build_document(&DocumentInput {
            reconciliation: &reconciliation,
            metadata: &metadata(),
            deviations,
            files,
        })
    }

    fn page_with(doc: &Document, needle: &str) -> Option<usize> {
        (0..doc.page_count()).find(|i| doc.texts_on(*i).contains(&needle))
    }

    #[test]
    fn title_page_carries_summary() {
        let doc = build(&catalog(3), &[], &[]);
        let texts = doc.texts_on(0);
        assert!(texts.contains(&"MISRA Guideline Compliance Summary"));
        assert!(texts.contains(&"Commit:"));
        assert!(texts.contains(&"3f2a9c1"));
        assert!(texts.contains(&"Compliant"));
        assert!(texts.contains(&"Rule 3.1"));
        assert!(matches!(doc.pages[0].ops[0], DrawOp::Image { .. }));
    }

    #[test]
    fn small_report_has_three_pages() {
        let doc = build(&catalog(3), &[], &files(2));
        assert_eq!(doc.page_count(), 3);
        assert_eq!(page_with(&doc, "Deviations"), Some(1));
        assert_eq!(page_with(&doc, "Files Analyzed"), Some(2));
        assert_eq!(page_with(&doc, "lib/src/file_1.c"), Some(2));
    }

    #[test]
    fn compliance_table_continues_onto_new_pages() {
        // 10 rows on the title page, 25 on the next, 1 on the third.
        let doc = build(&catalog(36), &[], &[]);
        assert_eq!(page_with(&doc, "Rule 10.1"), Some(0));
        assert_eq!(page_with(&doc, "Rule 11.1"), Some(1));
        assert_eq!(page_with(&doc, "Rule 35.1"), Some(1));
        assert_eq!(page_with(&doc, "Rule 36.1"), Some(2));
        assert_eq!(page_with(&doc, "Deviations"), Some(3));
        assert_eq!(page_with(&doc, "Files Analyzed"), Some(4));
    }

    #[test]
    fn sections_keep_independent_cursors() {
        let deviations: Vec<DeviationRecord> = (0..2)
            .map(|i| DeviationRecord {
                rule: format!("Directive {i}.1"),
                category: "Advisory".to_string(),
                rationale: "short".to_string(),
                row_height: Some(100.0),
            })
            .collect();
        let doc = build(&catalog(11), &deviations, &files(36));

        // Compliance spills to page 1; deviations start on 2 and spill to 3.
        assert_eq!(page_with(&doc, "Directive 0.1"), Some(2));
        assert_eq!(page_with(&doc, "Directive 1.1"), Some(3));
        // Files start on their own page after the deviations.
        assert_eq!(page_with(&doc, "Files Analyzed"), Some(4));
        assert_eq!(page_with(&doc, "lib/src/file_34.c"), Some(4));
        assert_eq!(page_with(&doc, "lib/src/file_35.c"), Some(5));
    }

    #[test]
    fn continuation_rows_restart_at_top_margin() {
        let doc = build(&catalog(11), &[], &[]);
        let first_fill = doc.pages[1]
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::FillRect { y, .. } => Some(*y),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_fill, 100.0);
    }

    #[test]
    fn verdict_tint_follows_parity_tint() {
        assert_eq!(row_tints(0, Verdict::Compliant), vec![WHITE]);
        assert_eq!(row_tints(1, Verdict::Compliant), vec![LIGHT_GREY]);
        assert_eq!(row_tints(1, Verdict::NonCompliant), vec![LIGHT_GREY, WARNING_TINT]);
        assert_eq!(row_tints(2, Verdict::Deviation), vec![WHITE, CAUTION_TINT]);
    }

    #[test]
    fn non_compliant_row_is_drawn_with_override_last() {
        let rules = catalog(1);
        let violations = vec![Violation::new("a.c", 1, "style", "m", "1.1")];
        let reconciliation = reconcile(&rules, &violations, &SuppressionSet::new());
        let doc = build_document(&DocumentInput {
            reconciliation: &reconciliation,
            metadata: &metadata(),
            deviations: &[],
            files: &[],
        });
        let fills: Vec<&str> = doc.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillRect { color, .. } => Some(color.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![WHITE, WARNING_TINT]);
        assert!(doc.texts_on(0).contains(&"Non-Compliant"));
        assert!(doc.texts_on(0).contains(&"NON-COMPLIANT"));
    }

    #[test]
    fn summary_sentence_pluralizes() {
        let mut tally = CategoryTally::default();
        tally.violations.insert(Category::Required, 1);
        tally.violations.insert(Category::Advisory, 3);
        tally.deviations.insert(Category::Required, 2);
        assert_eq!(
            summary_sentence(&tally),
            "There were 0 violations of mandatory guidelines, 1 violation of required guidelines, \
and 3 violations of advisory guidelines. There were also 0 deviations of mandatory guidelines, \
2 deviations of required guidelines, and 0 deviations of advisory guidelines."
        );
    }

    #[test]
    fn deviation_height_estimated_from_longest_cell() {
        let record = DeviationRecord {
            rule: "Directive 15.5".to_string(),
            category: "Advisory".to_string(),
            rationale: "x".repeat(100),
            row_height: None,
        };
        // 218pt column / 6pt glyphs = 36 chars per line -> 3 lines.
        assert_eq!(deviation_row_height(&record), 3.0 * 12.0 + 12.0);

        let fixed = DeviationRecord {
            row_height: Some(335.0),
            ..record
        };
        assert_eq!(deviation_row_height(&fixed), 335.0);

        let negative = DeviationRecord {
            row_height: Some(-10.0),
            ..fixed
        };
        assert_eq!(deviation_row_height(&negative), 3.0 * 12.0 + 12.0);
    }

    #[test]
    fn layout_is_deterministic() {
        let a = build(&catalog(40), &[], &files(80));
        let b = build(&catalog(40), &[], &files(80));
        assert_eq!(a, b);
    }
}
