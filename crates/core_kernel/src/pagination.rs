//! Pagination types for listing endpoints
//!
//! The listing API pages through customers ordered by identity and returns
//! an envelope describing where the page sits in the full result set. The
//! envelope math lives here so the HTTP layer and tests share one
//! implementation.

use serde::{Deserialize, Serialize};

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Default page size when the caller does not specify one
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// A validated page request
///
/// Page numbers are zero-based. Sizes are clamped to `1..=MAX_PAGE_SIZE`
/// so envelope math never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Creates a page request, clamping the size into the valid range
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Zero-based page number
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page size after clamping
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Row offset of the first item on this page
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    /// Row limit for this page
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Position of a page within the full result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_count: u64,
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageInfo {
    /// Computes the envelope for a page over `total_count` rows
    pub fn compute(request: PageRequest, total_count: u64) -> Self {
        let size = u64::from(request.size());
        let total_pages = total_count.div_ceil(size) as u32;
        let page = request.page();

        Self {
            total_count,
            current_page: page,
            page_size: request.size(),
            total_pages,
            has_next: total_pages > 0 && page < total_pages - 1,
            has_previous: page > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_of_five() {
        let info = PageInfo::compute(PageRequest::new(0, 2), 5);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next);
        assert!(!info.has_previous);
    }

    #[test]
    fn test_last_page_of_five() {
        let info = PageInfo::compute(PageRequest::new(2, 2), 5);
        assert!(!info.has_next);
        assert!(info.has_previous);
    }

    #[test]
    fn test_empty_result_set() {
        let info = PageInfo::compute(PageRequest::new(0, 10), 0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next);
        assert!(!info.has_previous);
    }

    #[test]
    fn test_exact_page_boundary() {
        let info = PageInfo::compute(PageRequest::new(1, 5), 10);
        assert_eq!(info.total_pages, 2);
        assert!(!info.has_next);
        assert!(info.has_previous);
    }

    #[test]
    fn test_size_is_clamped() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.size(), 1);

        let request = PageRequest::new(0, 10_000);
        assert_eq!(request.size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset_and_limit() {
        let request = PageRequest::new(3, 25);
        assert_eq!(request.offset(), 75);
        assert_eq!(request.limit(), 25);
    }
}
