//! Client-side pagination over an in-memory collection.
//!
//! The backing list is fetched whole; paging is purely a view concern. Page
//! navigation is a bounded no-op at either end, and mutation sites call
//! [`Paged::reclamp`] so the current page never points past the data.

/// Default rows per page in the admin list screens.
pub const DEFAULT_PAGE_SIZE: usize = 3;

/// A windowed view over a vector of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paged<T> {
    /// The full collection, in server order.
    pub items: Vec<T>,
    /// Rows per page. Never zero.
    pub page_size: usize,
    /// Zero-based current page index.
    pub current_page: usize,
}

impl<T> Default for Paged<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 0,
        }
    }
}

impl<T> Paged<T> {
    /// Creates an empty collection with the given page size.
    ///
    /// A zero `page_size` is bumped to one so the page math stays defined.
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            page_size: page_size.max(1),
            current_page: 0,
        }
    }

    /// Number of pages; an empty collection still has one (empty) page.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.items.len().div_ceil(self.page_size).max(1)
    }

    /// The slice of items visible on the current page.
    #[must_use]
    pub fn current_view(&self) -> &[T] {
        let start = self.current_page * self.page_size;
        let end = (start + self.page_size).min(self.items.len());
        if start >= self.items.len() {
            &[]
        } else {
            &self.items[start..end]
        }
    }

    /// Replaces the whole collection, keeping the page in range.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.reclamp();
    }

    /// Pulls the current page back into range after a mutation.
    pub fn reclamp(&mut self) {
        let last = self.page_count() - 1;
        if self.current_page > last {
            self.current_page = last;
        }
    }

    /// Advances one page; no-op on the last page.
    pub fn next_page(&mut self) {
        if self.current_page + 1 < self.page_count() {
            self.current_page += 1;
        }
    }

    /// Goes back one page; no-op on the first page.
    pub fn prev_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1);
    }
}
