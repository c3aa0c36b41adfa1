//! Page cursor primitives shared by every paginated document section.
//!
//! A section owns one `PageCursor` for the duration of a rendering pass.
//! Cursors are plain values: nothing is shared between sections or runs,
//! so the placement of row `i` depends only on `i`, the row heights and
//! the section's `PageCapacity`.

use serde::{Deserialize, Serialize};

/// Per-section page geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageCapacity {
    /// Rows that fit below the content already on the section's first page.
    pub first_page_rows: usize,
    /// Rows that fit on every continuation page.
    pub other_page_rows: usize,
    /// Vertical offset of the first row on the first page.
    pub first_page_top: f32,
    /// Vertical offset of the first row on continuation pages.
    pub continuation_top: f32,
}

impl PageCapacity {
    /// Row capacity of a page, relative to the section start. Never zero.
    pub fn rows_on(&self, page_index: usize) -> usize {
        let rows = if page_index == 0 {
            self.first_page_rows
        } else {
            self.other_page_rows
        };
        rows.max(1)
    }
}

/// Where a row landed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub page_index: usize,
    pub y: f32,
    /// True when this row opened a new page.
    pub page_break: bool,
}

/// Layout cursor for one section of one rendering pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PageCursor {
    capacity: PageCapacity,
    page_index: usize,
    rows_on_page: usize,
    offset: f32,
}

impl PageCursor {
    pub fn new(capacity: PageCapacity) -> Self {
        Self {
            capacity,
            page_index: 0,
            rows_on_page: 0,
            offset: capacity.first_page_top,
        }
    }

    /// Place a row of the given height, breaking the page first when the
    /// current page is full.
    pub fn place(&mut self, height: f32) -> Placement {
        let page_break = self.rows_on_page == self.capacity.rows_on(self.page_index);
        if page_break {
            self.page_index += 1;
            self.rows_on_page = 0;
            self.offset = self.capacity.continuation_top;
        }

        let y = self.offset;
        self.offset += height;
        self.rows_on_page += 1;

        Placement {
            page_index: self.page_index,
            y,
            page_break,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn rows_on_page(&self) -> usize {
        self.rows_on_page
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }
}
