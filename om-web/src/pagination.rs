//! Pagination utilities for list pages
//!
//! The watchlist and the exclusions table show 50 rows per page, the
//! provider and procedure lists 100.

use serde::Serialize;

/// Rows per page on the watchlist and recent exclusions table
pub const SMALL_PAGE: usize = 50;
/// Rows per page on the provider and procedure lists
pub const LARGE_PAGE: usize = 100;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: usize,
    /// Total number of pages
    pub total_pages: usize,
    /// Index of the first row on this page
    pub offset: usize,
    pub page_size: usize,
    pub total: usize,
}

impl Pagination {
    /// Rows of `items` that belong to this page
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = (self.offset + self.page_size).min(items.len());
        &items[start..end]
    }

    /// 1-based index of the first row shown, 0 when there are none
    pub fn first_row(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.offset + 1
        }
    }

    pub fn last_row(&self) -> usize {
        (self.offset + self.page_size).min(self.total)
    }
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, total_pages]
///
/// # Examples
/// ```
/// use om_web::pagination::calculate_pagination;
///
/// // 250 total results = 3 pages (100 + 100 + 50)
/// let p = calculate_pagination(250, 2, 100);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 100);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(250, 99, 100);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 200);
/// ```
pub fn calculate_pagination(total_results: usize, requested_page: usize, page_size: usize) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = total_results.div_ceil(page_size);
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        total_pages,
        offset,
        page_size,
        total: total_results,
    }
}
