//! Fixed-size, 1-indexed pagination.

use serde::Serialize;

/// One page of a filtered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// The page actually returned, after clamping.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    /// Never zero: an empty listing still has one (empty) page.
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Cuts `items` into pages of `page_size` and returns page `requested`.
    ///
    /// `requested` is clamped into `1..=total_pages`, so page 0 yields the
    /// first page and anything past the end yields the last one.
    pub fn paginate(items: Vec<T>, requested: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(page_size).max(1);
        let page = requested.clamp(1, total_pages);

        let items = items
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
        }
    }

    /// Transforms the items of the page, keeping its position.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}
