// src/app/pagination.rs
use super::types::PAGE_SIZE;

/// `ceil(total / PAGE_SIZE)`, floored at 1 so the pager always has a page.
pub const fn page_count(total_results: u32) -> u32 {
    let pages = total_results.div_ceil(PAGE_SIZE);
    if pages == 0 {
        1
    } else {
        pages
    }
}

/// Current page plus the derived page count; `page` stays in `1..=page_count`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    page_count: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_count: 1,
        }
    }
}

impl Pagination {
    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn set_total_results(&mut self, total_results: u32) {
        self.page_count = page_count(total_results);
        self.page = self.page.min(self.page_count);
    }

    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub const fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    /// Returns true if the page moved.
    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }
}
