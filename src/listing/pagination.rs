use serde::Serialize;

/// Maximum number of page buttons shown by a paginator.
pub const PAGE_WINDOW: usize = 5;

/// Page numbers (1-based) to render as paginator buttons.
///
/// At most [`PAGE_WINDOW`] pages are returned. The window sticks to the
/// first pages near the start, to the last pages near the end and is centred
/// on `current_page` otherwise.
pub fn page_window(current_page: usize, total_pages: usize) -> Vec<usize> {
    if total_pages == 0 {
        return vec![];
    }
    if total_pages <= PAGE_WINDOW {
        return (1..=total_pages).collect();
    }

    let current_page = current_page.clamp(1, total_pages);
    let half = PAGE_WINDOW / 2;

    let start = if current_page <= half + 1 {
        1
    } else if current_page + half >= total_pages {
        total_pages + 1 - PAGE_WINDOW
    } else {
        current_page - half
    };

    (start..start + PAGE_WINDOW).collect()
}

/// Number of pages needed to show `total_items` rows.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

pub fn has_previous(current_page: usize) -> bool {
    current_page > 1
}

pub fn has_next(current_page: usize, total_pages: usize) -> bool {
    current_page < total_pages
}

/// Page reached by the "previous" control, never below the first page.
pub fn previous_page(current_page: usize) -> usize {
    current_page.saturating_sub(1).max(1)
}

/// Page reached by the "next" control, never past the last page.
pub fn next_page(current_page: usize, total_pages: usize) -> usize {
    (current_page + 1).min(total_pages.max(1))
}

/// One page of rows as returned by a list source.
///
/// `page_number` follows the backend convention and is 0-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: usize,
    pub total_pages: usize,
    pub page_number: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_items: usize, total_pages: usize, page_number: usize) -> Self {
        Self {
            items,
            total_items,
            total_pages,
            page_number,
        }
    }

    pub fn empty(page_number: usize) -> Self {
        Self::new(Vec::new(), 0, 0, page_number)
    }

    /// Slices one page out of a fully fetched collection.
    ///
    /// `page` is 1-based; a page past the end yields no items.
    pub fn from_slice(rows: Vec<T>, page: usize, page_size: usize) -> Self {
        let total_items = rows.len();
        let total_pages = total_pages(total_items, page_size);
        let page = page.max(1);
        let items = rows
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();

        Self::new(items, total_items, total_pages, page - 1)
    }

    /// `page_number` lies inside `0..total_pages` whenever rows exist.
    pub fn is_consistent(&self) -> bool {
        self.total_items == 0 || self.page_number < self.total_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            total_pages: self.total_pages,
            page_number: self.page_number,
        }
    }
}

/// How the UI page must move after comparing a response with its request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resync {
    /// The backend answered the page that was asked for.
    InSync,
    /// The backend answered a different page; the rows belong to this UI page.
    Adopt(usize),
    /// The requested page lies past the end; this is the last valid UI page.
    Clamp(usize),
}

/// Compares the requested 1-based UI page with the backend's answer.
pub fn resync<T>(requested_page: usize, page: &Page<T>) -> Resync {
    let answered = page.page_number + 1;
    if answered != requested_page {
        return Resync::Adopt(answered);
    }
    if page.total_items > 0 && page.items.is_empty() && requested_page > page.total_pages {
        return Resync::Clamp(page.total_pages);
    }
    Resync::InSync
}

/// Rows of one page bundled with everything a paginator needs to render.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<usize>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, total_pages: usize, total_items: usize) -> Self {
        let current_page = if current_page == 0 { 1 } else { current_page };

        Self {
            items,
            pages: page_window(current_page, total_pages),
            page: current_page,
            total_pages,
            total_items,
            has_previous: has_previous(current_page),
            has_next: has_next(current_page, total_pages),
        }
    }
}

impl<T> From<Page<T>> for Paginated<T> {
    fn from(page: Page<T>) -> Self {
        Self::new(
            page.items,
            page.page_number + 1,
            page.total_pages,
            page.total_items,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_sticks_to_start() {
        assert_eq!(page_window(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(3, 10), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn window_sticks_to_end() {
        assert_eq!(page_window(10, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(8, 10), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn window_centres_on_current_page() {
        assert_eq!(page_window(5, 10), vec![3, 4, 5, 6, 7]);
        assert_eq!(page_window(7, 10), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn small_totals_show_every_page() {
        for current in 1..=3 {
            assert_eq!(page_window(current, 3), vec![1, 2, 3]);
        }
        assert_eq!(page_window(4, 5), vec![1, 2, 3, 4, 5]);
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn out_of_range_current_page_is_clamped() {
        assert_eq!(page_window(42, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(0, 10), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn next_and_previous_clamp_at_boundaries() {
        assert_eq!(previous_page(1), 1);
        assert_eq!(previous_page(4), 3);
        assert_eq!(next_page(10, 10), 10);
        assert_eq!(next_page(3, 10), 4);
        assert_eq!(next_page(1, 0), 1);
        assert!(!has_previous(1));
        assert!(!has_next(10, 10));
        assert!(has_next(9, 10));
    }

    #[test]
    fn from_slice_cuts_requested_page() {
        let page = Page::from_slice((1..=12).collect::<Vec<_>>(), 2, 5);
        assert_eq!(page.items, vec![6, 7, 8, 9, 10]);
        assert_eq!(page.total_items, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page_number, 1);

        let past_end = Page::from_slice((1..=12).collect::<Vec<_>>(), 9, 5);
        assert!(past_end.items.is_empty());
    }

    #[test]
    fn resync_adopts_backend_page() {
        let page = Page::new(vec![1], 15, 2, 1);
        assert_eq!(resync(3, &page), Resync::Adopt(2));
        assert_eq!(resync(2, &page), Resync::InSync);
    }

    #[test]
    fn resync_clamps_past_the_end() {
        let page: Page<u8> = Page::new(vec![], 15, 2, 4);
        assert_eq!(resync(5, &page), Resync::Clamp(2));
        let empty: Page<u8> = Page::empty(0);
        assert_eq!(resync(1, &empty), Resync::InSync);
    }

    #[test]
    fn paginated_reports_navigation_flags() {
        let paginated = Paginated::new(vec!["a"], 1, 3, 21);
        assert_eq!(paginated.pages, vec![1, 2, 3]);
        assert!(!paginated.has_previous);
        assert!(paginated.has_next);
    }
}
