//! Offset pagination shared by list endpoints.

use serde::Serialize;

/// Page size used when the caller supplies none or an out-of-range value.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A normalized page request. Always has `page >= 1` and `1 <= page_size <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Clamps raw query values: pages below 1 become 1, sizes outside
    /// `1..=100` fall back to the default.
    pub fn normalize(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p.min(u32::MAX as i64) as u32,
            _ => 1,
        };
        let page_size = match page_size {
            Some(s) if (1..=MAX_PAGE_SIZE as i64).contains(&s) => s as u32,
            _ => DEFAULT_PAGE_SIZE,
        };
        Self { page, page_size }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    /// Row limit.
    pub fn limit(&self) -> u64 {
        self.page_size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::normalize(None, None)
    }
}

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        let size = request.page_size as u64;
        let total_pages = (total + size - 1) / size;
        let next_page = if (request.page as u64) < total_pages {
            Some(request.page + 1)
        } else {
            None
        };
        let prev_page = if request.page > 1 {
            Some(request.page - 1)
        } else {
            None
        };

        Self {
            data,
            page: request.page,
            page_size: request.page_size,
            total,
            total_pages,
            next_page,
            prev_page,
        }
    }

    /// Converts the items while keeping the navigation metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
            next_page: self.next_page,
            prev_page: self.prev_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_clamps_page_below_one() {
        let req = PageRequest::normalize(Some(0), Some(20));
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 20);

        let req = PageRequest::normalize(Some(-5), None);
        assert_eq!(req.page(), 1);
    }

    #[test]
    fn normalize_resets_out_of_range_page_size() {
        assert_eq!(PageRequest::normalize(None, Some(0)).page_size(), 10);
        assert_eq!(PageRequest::normalize(None, Some(101)).page_size(), 10);
        assert_eq!(PageRequest::normalize(None, Some(100)).page_size(), 100);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let req = PageRequest::normalize(Some(3), Some(25));
        assert_eq!(req.offset(), 50);
        assert_eq!(req.limit(), 25);
    }

    #[test]
    fn page_navigation_links() {
        let first = Page::new(vec![1, 2], PageRequest::normalize(Some(1), Some(2)), 5);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.next_page, Some(2));
        assert_eq!(first.prev_page, None);

        let last = Page::new(vec![5], PageRequest::normalize(Some(3), Some(2)), 5);
        assert_eq!(last.next_page, None);
        assert_eq!(last.prev_page, Some(2));
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page: Page<u8> = Page::new(vec![], PageRequest::default(), 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.next_page, None);
    }

    proptest! {
        #[test]
        fn total_pages_is_ceiling_of_total_over_size(n in 0u64..10_000, p in 1i64..=100) {
            let req = PageRequest::normalize(Some(1), Some(p));
            let page: Page<()> = Page::new(vec![], req, n);
            let p = p as u64;
            prop_assert_eq!(page.total_pages, (n + p - 1) / p);
        }
    }
}
