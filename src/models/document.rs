//! Page-description model for the printable compliance report.
//!
//! A `Document` is an ordered list of pages, each an ordered list of
//! positioned draw instructions. Coordinates are PDF points measured from
//! the top-left corner of a US Letter page.

use serde::Serialize;

/// Font faces available to the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
}

/// One typed table cell. Rows are explicit ordered lists of cells, so
/// column meaning never depends on field declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub text: String,
    pub width: f32,
}

impl Cell {
    pub fn new(text: impl Into<String>, width: f32) -> Self {
        Self {
            text: text.into(),
            width,
        }
    }
}

/// A single draw instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Image {
        name: String,
        x: f32,
        y: f32,
        width: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: String,
        /// Wrapping width; `None` lets the text run to the right margin.
        width: Option<f32>,
        align: Align,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: String,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
        color: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

/// A drawing backend the document can be replayed onto.
pub trait Surface {
    /// Start a new page. Called once per page, before its instructions.
    fn begin_page(&mut self, index: usize);

    fn draw(&mut self, op: &DrawOp);
}

impl Document {
    /// Open a new blank page and return its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::default());
        self.pages.len() - 1
    }

    /// Append an instruction to a page, opening pages up to `index` as needed.
    pub fn push(&mut self, index: usize, op: DrawOp) {
        while self.pages.len() <= index {
            self.pages.push(Page::default());
        }
        self.pages[index].ops.push(op);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every text instruction on a page, in draw order.
    pub fn texts_on(&self, index: usize) -> Vec<&str> {
        self.pages
            .get(index)
            .map(|page| {
                page.ops
                    .iter()
                    .filter_map(|op| match op {
                        DrawOp::Text { text, .. } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Draw every page, in order, onto a surface.
    pub fn replay<S: Surface>(&self, surface: &mut S) {
        for (index, page) in self.pages.iter().enumerate() {
            surface.begin_page(index);
            for op in &page.ops {
                surface.draw(op);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Surface for Recorder {
        fn begin_page(&mut self, index: usize) {
            self.events.push(format!("page {index}"));
        }

        fn draw(&mut self, op: &DrawOp) {
            let name = match op {
                DrawOp::Image { .. } => "image",
                DrawOp::Text { .. } => "text",
                DrawOp::FillRect { .. } => "fill",
                DrawOp::StrokeRect { .. } => "stroke",
            };
            self.events.push(name.to_string());
        }
    }

    fn fill(y: f32) -> DrawOp {
        DrawOp::FillRect {
            x: 75.0,
            y,
            width: 10.0,
            height: 10.0,
            color: "#ffffff".to_string(),
        }
    }

    #[test]
    fn push_opens_missing_pages() {
        let mut doc = Document::default();
        doc.push(2, fill(0.0));
        assert_eq!(doc.page_count(), 3);
        assert!(doc.pages[0].ops.is_empty());
        assert_eq!(doc.pages[2].ops.len(), 1);
    }

    #[test]
    fn replay_visits_pages_in_order() {
        let mut doc = Document::default();
        doc.push(0, fill(0.0));
        doc.push(1, fill(10.0));
        doc.push(1, fill(20.0));

        let mut recorder = Recorder::default();
        doc.replay(&mut recorder);
        assert_eq!(recorder.events, vec!["page 0", "fill", "page 1", "fill", "fill"]);
    }

    #[test]
    fn draw_ops_are_tagged_in_json() {
        let json = serde_json::to_value(fill(5.0)).unwrap();
        assert_eq!(json["op"], "fill_rect");
        assert_eq!(json["y"], 5.0);
    }
}
