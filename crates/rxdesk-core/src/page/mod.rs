//! Pagination types shared by the resource client and the list controller.

mod envelope;
mod filter;

pub use envelope::{normalize_page_result, Envelope, EnvelopeError};
pub use filter::{FilterSet, FilterState, InvalidAssignment};

use crate::resource::ResourceRecord;
use std::fmt;

/// What a list screen asks the backend for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    pub filters: FilterSet,
}

impl PageRequest {
    /// Page and size are raised to at least 1.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            filters: FilterSet::new(),
        }
    }

    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// Clamps `page` into `[1, total_pages]` once the total is known.
    pub fn clamp_to(&mut self, total_count: u64) {
        self.page = clamp_page(self.page, self.page_size, total_count);
    }
}

/// One normalized page of records.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub items: Vec<ResourceRecord>,
    pub current_page: u32,
    pub page_size: u32,
    /// Size of the filtered set, not of the whole table.
    pub total_count: u64,
}

impl PageResult {
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            current_page: page,
            page_size,
            total_count: 0,
        }
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, self.page_size)
    }

    pub fn display_range(&self) -> Option<DisplayRange> {
        display_range(self.current_page, self.page_size, self.total_count)
    }
}

/// `ceil(total_count / page_size)`; zero when there is nothing to show.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

pub fn clamp_page(page: u32, page_size: u32, total_count: u64) -> u32 {
    let last = total_pages(total_count, page_size);
    page.clamp(1, last.max(1))
}

/// "Showing X to Y of Z items".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRange {
    pub first: u64,
    pub last: u64,
    pub total: u64,
}

impl fmt::Display for DisplayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} to {} of {} items",
            self.first, self.last, self.total
        )
    }
}

/// Range label for a page. None when the set is empty or the page is past the end.
pub fn display_range(page: u32, page_size: u32, total_count: u64) -> Option<DisplayRange> {
    if total_count == 0 || page == 0 || page_size == 0 {
        return None;
    }
    let size = u64::from(page_size);
    let first = u64::from(page - 1) * size + 1;
    if first > total_count {
        return None;
    }
    let last = (u64::from(page) * size).min(total_count);
    Some(DisplayRange {
        first,
        last,
        total: total_count,
    })
}
