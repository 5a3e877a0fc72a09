//! Page arithmetic over the shared page window
//!
//! Pages are 1-based for presentation, offsets are 0-based for the server.

use crate::core::criteria::{CriteriaStore, PageWindow};
use serde::Serialize;

/// Pagination metadata derived from the window and the server total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    /// Current page number (starts at 1)
    pub current_page: u64,

    /// Number of items per page
    pub size: u64,

    /// Zero-based offset of the first item of the page
    pub offset: u64,

    /// Total number of matches reported by the server
    pub total: u64,

    /// Total number of pages (0 when there are no matches)
    pub total_pages: u64,

    /// Whether a "next" control should be enabled
    pub has_next: bool,

    /// Whether a "previous" control should be enabled
    pub has_prev: bool,
}

impl PageState {
    pub fn new(window: PageWindow, total: u64) -> Self {
        // Ensure size is at least 1 to avoid division by zero
        let size = window.size.max(1);

        Self {
            current_page: window.offset / size + 1,
            size,
            offset: window.offset,
            total,
            total_pages: PaginationController::total_pages(total, size),
            has_next: window.offset + size < total,
            has_prev: window.offset > 0,
        }
    }
}

/// Navigation over the offset held by a [`CriteriaStore`]
///
/// Only `jump_to` clamps against the known total. `next_page` never refuses
/// to move past the end: callers disable the control when
/// [`PageState::has_next`] is false.
pub struct PaginationController;

impl PaginationController {
    /// `ceil(total / size)`, 0 when `total == 0`
    pub fn total_pages(total: u64, size: u64) -> u64 {
        if total == 0 {
            0
        } else {
            total.div_ceil(size.max(1))
        }
    }

    pub fn current_page(window: PageWindow) -> u64 {
        window.offset / window.size.max(1) + 1
    }

    /// Jump to `page`, clamped into `[1, total_pages]`
    ///
    /// Returns the page actually selected. With no results the only page is 1.
    pub fn jump_to(store: &mut CriteriaStore, total: u64, page: u64) -> u64 {
        let size = store.window().size;
        let last = Self::total_pages(total, size).max(1);
        let page = page.clamp(1, last);

        store.set_offset((page - 1) * size);
        page
    }

    pub fn next_page(store: &mut CriteriaStore) -> u64 {
        let window = store.window();
        let offset = window.offset + window.size;
        store.set_offset(offset);
        offset
    }

    /// Step back one page, saturating at offset 0
    pub fn prev_page(store: &mut CriteriaStore) -> u64 {
        let window = store.window();
        let offset = window.offset.saturating_sub(window.size);
        store.set_offset(offset);
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::criteria::SortOrder;

    fn store(size: u64) -> CriteriaStore {
        CriteriaStore::new(size, SortOrder::default())
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(PaginationController::total_pages(120, 28), 5);
        assert_eq!(PaginationController::total_pages(145, 20), 8);
        assert_eq!(PaginationController::total_pages(100, 25), 4);
        assert_eq!(PaginationController::total_pages(0, 25), 0);
    }

    #[test]
    fn test_jump_to_clamps_both_ends() {
        let mut s = store(28);

        assert_eq!(PaginationController::jump_to(&mut s, 120, 0), 1);
        assert_eq!(s.window().offset, 0);

        assert_eq!(PaginationController::jump_to(&mut s, 120, 99), 5);
        assert_eq!(s.window().offset, 112);

        assert_eq!(PaginationController::jump_to(&mut s, 120, 3), 3);
        assert_eq!(s.window().offset, 56);
    }

    #[test]
    fn test_jump_to_without_results_lands_on_first_page() {
        let mut s = store(25);
        s.set_offset(75);
        assert_eq!(PaginationController::jump_to(&mut s, 0, 4), 1);
        assert_eq!(s.window().offset, 0);
    }

    #[test]
    fn test_prev_page_saturates() {
        let mut s = store(25);
        s.set_offset(10);
        assert_eq!(PaginationController::prev_page(&mut s), 0);
        assert_eq!(PaginationController::prev_page(&mut s), 0);
    }

    #[test]
    fn test_next_page_is_not_clamped() {
        let mut s = store(25);
        s.set_offset(75);
        assert_eq!(PaginationController::next_page(&mut s), 100);
        let state = PageState::new(s.window(), 90);
        assert!(!state.has_next);
        assert_eq!(state.current_page, 5);
    }

    #[test]
    fn test_page_state() {
        let mut s = store(20);
        s.set_offset(20);
        let state = PageState::new(s.window(), 145);
        assert_eq!(state.current_page, 2);
        assert_eq!(state.total_pages, 8);
        assert!(state.has_prev);
        assert!(state.has_next);

        let empty = PageState::new(store(20).window(), 0);
        assert_eq!(empty.current_page, 1);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }
}
