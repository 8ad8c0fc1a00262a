//! Fixed-size page-number pagination with clamping.
//!
//! Every listing in the service is split into pages of a fixed size. The
//! requested page arrives as an untrusted query-string value; anything that
//! does not name a valid page is clamped rather than rejected: unparseable
//! values select the first page, numeric values outside the valid range
//! (below one or past the end) select the last. An empty collection still
//! has exactly one (empty) page.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Splits an ordered collection into fixed-size pages.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: u32,
}

/// The resolved window for one page: which rows to fetch and where the page
/// sits within the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub offset: u64,
    pub limit: u32,
}

impl Paginator {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Resolve a raw `page` query value against the collection size.
    pub fn window(&self, total_items: u64, requested: Option<&str>) -> PageWindow {
        let total_pages = self.total_pages(total_items);
        let page = match requested.and_then(|raw| raw.trim().parse::<i64>().ok()) {
            None => 1,
            Some(n) if n >= 1 && n <= i64::from(total_pages) => n as u32,
            Some(_) => total_pages,
        };

        PageWindow {
            page,
            total_pages,
            total_items,
            offset: u64::from(page - 1) * u64::from(self.page_size),
            limit: self.page_size,
        }
    }

    fn total_pages(&self, total_items: u64) -> u32 {
        let pages = total_items.div_ceil(u64::from(self.page_size));
        pages.clamp(1, u64::from(u32::MAX)) as u32
    }
}

/// One page of items plus the metadata the templates need to render the
/// pager controls.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            page: window.page,
            total_pages: window.total_pages,
            total_items: window.total_items,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_items_split_ten_and_five() {
        let paginator = Paginator::new(10);

        let first = paginator.window(15, Some("1"));
        assert_eq!(first.offset, 0);
        assert_eq!(first.limit, 10);
        assert_eq!(first.total_pages, 2);

        let second = paginator.window(15, Some("2"));
        assert_eq!(second.offset, 10);
        // The repository LIMIT stays at the page size; only five rows exist
        // past the offset, so the last page carries the remainder.
        assert_eq!(second.limit, 10);
    }

    #[test]
    fn overflowing_page_clamps_to_last() {
        let window = Paginator::new(10).window(15, Some("99"));
        assert_eq!(window.page, 2);
        assert_eq!(window.offset, 10);
    }

    #[test]
    fn negative_or_zero_page_clamps_to_last() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.window(15, Some("-3")).page, 2);
        assert_eq!(paginator.window(15, Some("0")).page, 2);
        assert_eq!(paginator.window(15, Some("-3")).offset, 10);
    }

    #[test]
    fn nonsense_page_selects_first() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.window(15, Some("abc")).page, 1);
        assert_eq!(paginator.window(15, Some("")).page, 1);
        assert_eq!(paginator.window(15, None).page, 1);
    }

    #[test]
    fn empty_collection_has_one_empty_page() {
        let window = Paginator::new(10).window(0, Some("4"));
        assert_eq!(window.page, 1);
        assert_eq!(window.total_pages, 1);
        assert_eq!(window.total_items, 0);
    }

    #[test]
    fn zero_page_size_is_clamped() {
        assert_eq!(Paginator::new(0).page_size(), 1);
    }

    #[test]
    fn paginated_navigation_flags() {
        let paginator = Paginator::new(10);
        let first = Paginated::new(vec![0u8; 10], paginator.window(15, Some("1")));
        assert!(!first.has_previous());
        assert!(first.has_next());

        let last = Paginated::new(vec![0u8; 5], paginator.window(15, Some("2")));
        assert!(last.has_previous());
        assert!(!last.has_next());
    }
}
