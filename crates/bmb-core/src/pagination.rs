//! Offset pagination over an already-fetched collection.
//!
//! List endpoints fetch the full collection and slice it in memory, so every
//! page request costs O(n) in the collection size. Query-level offset/limit
//! would lift that ceiling but changes what existing generated projects do.

use serde::Serialize;

use crate::config::PaginationConfig;

/// A resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: usize,
    /// Items per page, already capped at the configured maximum.
    pub page_size: usize,
}

impl PageRequest {
    /// Resolve raw query values against the configured limits.
    ///
    /// Missing values use page 1 and the default page size. Page numbers
    /// below 1 and page sizes of 0 are raised to 1.
    pub fn new(page: Option<usize>, page_size: Option<usize>, config: &PaginationConfig) -> Self {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size
            .unwrap_or(config.default_page_size)
            .min(config.max_page_size)
            .max(1);
        Self { page, page_size }
    }

    /// Index of the first item on this page.
    pub fn start(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Index one past the last item on this page.
    pub fn end(&self) -> usize {
        self.start().saturating_add(self.page_size)
    }

    /// Number of pages needed for `total` items.
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// The items on this page. Pages past the end are empty.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.start().min(items.len());
        let end = self.end().min(items.len());
        &items[start..end]
    }

    /// Pagination metadata for a response body.
    pub fn info(&self, total: usize) -> PageInfo {
        PageInfo {
            page: self.page,
            page_size: self.page_size,
            total,
            total_pages: self.total_pages(total),
        }
    }
}

/// Pagination block returned alongside list results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaginationConfig {
        PaginationConfig {
            default_page_size: 20,
            max_page_size: 100,
        }
    }

    #[test]
    fn test_twenty_three_items_in_pages_of_ten() {
        let items: Vec<usize> = (0..23).collect();

        let first = PageRequest::new(Some(1), Some(10), &config());
        assert_eq!(first.slice(&items).len(), 10);
        assert_eq!(first.total_pages(items.len()), 3);

        let third = PageRequest::new(Some(3), Some(10), &config());
        assert_eq!(third.slice(&items), &[20, 21, 22]);

        let fourth = PageRequest::new(Some(4), Some(10), &config());
        assert!(fourth.slice(&items).is_empty());
    }

    #[test]
    fn test_defaults_and_cap() {
        let req = PageRequest::new(None, None, &config());
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 20);

        let req = PageRequest::new(Some(2), Some(500), &config());
        assert_eq!(req.page_size, 100);
        assert_eq!(req.start(), 100);
        assert_eq!(req.end(), 200);
    }

    #[test]
    fn test_degenerate_values_are_clamped() {
        let req = PageRequest::new(Some(0), Some(0), &config());
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 1);
        assert_eq!(req.total_pages(0), 0);
    }

    #[test]
    fn test_info() {
        let req = PageRequest::new(Some(2), Some(10), &config());
        let info = req.info(23);
        assert_eq!(
            info,
            PageInfo {
                page: 2,
                page_size: 10,
                total: 23,
                total_pages: 3
            }
        );
    }
}
