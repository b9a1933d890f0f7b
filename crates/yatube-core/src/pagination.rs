//! Fixed-size pagination of ordered result sets.
//!
//! Page numbers come straight from the `?page=` query parameter and are
//! resolved leniently: missing or non-integer input selects the first page,
//! and a number outside `1..=num_pages` selects the last page.

use serde::Serialize;

/// Where one page sits inside a result set of `count` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number actually served.
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub offset: u64,
    pub limit: u64,
}

/// A page of items plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u64>,
    pub previous_page_number: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(window: PageWindow, items: Vec<T>) -> Self {
        let has_next = window.number < window.num_pages;
        let has_previous = window.number > 1;
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_next,
            has_previous,
            next_page_number: has_next.then(|| window.number + 1),
            previous_page_number: has_previous.then(|| window.number - 1),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transform the items, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_next: self.has_next,
            has_previous: self.has_previous,
            next_page_number: self.next_page_number,
            previous_page_number: self.previous_page_number,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: u64,
}

impl Paginator {
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of pages for `count` items; an empty set still has one page.
    pub fn num_pages(&self, count: u64) -> u64 {
        count.div_ceil(self.per_page).max(1)
    }

    /// Resolve the requested page against a result set of `count` items.
    pub fn window(&self, count: u64, requested: Option<&str>) -> PageWindow {
        let num_pages = self.num_pages(count);
        let number = match requested.and_then(parse_page_number) {
            None => 1,
            Some(n) if n < 1 || n as u64 > num_pages => num_pages,
            Some(n) => n as u64,
        };
        let offset = (number - 1) * self.per_page;

        PageWindow {
            number,
            num_pages,
            count,
            offset,
            limit: self.per_page,
        }
    }

    /// Paginate an ordered in-memory sequence.
    pub fn page_of<T: Clone>(&self, items: &[T], requested: Option<&str>) -> Page<T> {
        let window = self.window(items.len() as u64, requested);
        let start = (window.offset as usize).min(items.len());
        let end = (start + window.limit as usize).min(items.len());
        Page::new(window, items[start..end].to_vec())
    }
}

/// Decimal integers only, surrounding whitespace ignored.
fn parse_page_number(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thirteen() -> Vec<u32> {
        (0..13).collect()
    }

    #[test]
    fn test_first_page_holds_ten_and_second_three() {
        let paginator = Paginator::new(10);
        let items = thirteen();

        let first = paginator.page_of(&items, None);
        assert_eq!(first.len(), 10);
        assert_eq!(first.num_pages, 2);
        assert!(first.has_next);
        assert!(!first.has_previous);
        assert_eq!(first.next_page_number, Some(2));

        let second = paginator.page_of(&items, Some("2"));
        assert_eq!(second.items, vec![10, 11, 12]);
        assert!(!second.has_next);
        assert!(second.has_previous);
        assert_eq!(second.previous_page_number, Some(1));
    }

    #[test]
    fn test_non_integer_page_falls_back_to_first() {
        let paginator = Paginator::new(10);
        for raw in ["abc", "", "1.5", "NaN"] {
            assert_eq!(paginator.window(13, Some(raw)).number, 1, "input {raw:?}");
        }
    }

    #[test]
    fn test_out_of_range_page_clamps_to_last() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.window(13, Some("99")).number, 2);
        assert_eq!(paginator.window(13, Some("0")).number, 2);
        assert_eq!(paginator.window(13, Some("-4")).number, 2);
    }

    #[test]
    fn test_float_like_page_falls_back_to_first() {
        let paginator = Paginator::new(10);
        for raw in ["2.0", "1e1", " 2.0 "] {
            let window = paginator.window(13, Some(raw));
            assert_eq!(window.number, 1, "input {raw:?}");
            assert_eq!(window.offset, 0);
        }
        assert_eq!(paginator.window(13, Some(" 2 ")).number, 2);
    }

    #[test]
    fn test_empty_sequence_has_one_empty_page() {
        let paginator = Paginator::new(10);
        let page = paginator.page_of::<u32>(&[], Some("3"));
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.is_empty());
        assert!(!page.has_next && !page.has_previous);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Paginator::new(5).page_of(&thirteen(), Some("3"));
        let mapped = page.map(|n| n * 2);
        assert_eq!(mapped.items, vec![20, 22, 24]);
        assert_eq!(mapped.number, 3);
        assert_eq!(mapped.count, 13);
    }
}
